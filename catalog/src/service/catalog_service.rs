//! Catalog Service
//!
//! Owns the database handle and the in-memory tag hierarchy. Each public
//! operation locks the connection once and runs to completion inside one
//! transaction. The hierarchy is only touched while that lock is held, so
//! it changes in the same order as storage does.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use rusqlite::{Connection, Transaction};

use crate::domain::{DomainResult, Tag};
use crate::hierarchy::TagForest;
use crate::repository::{
    data_version, in_transaction, read_only, DbState, Repository, TagRepository,
};

pub struct CatalogService {
    db: DbState,
    forest: TagForest,
    /// `data_version` of the connection when the forest was last loaded
    loaded_version: AtomicI64,
}

impl CatalogService {
    /// Build the service, loading the tag hierarchy from storage
    pub async fn open(db: DbState) -> DomainResult<Self> {
        let (forest, version) = {
            let mut conn = db.lock().await;
            let version = data_version(&conn)?;
            (TagForest::from_tags(load_tags(&mut conn)?)?, version)
        };
        log::info!("Catalog service opened with {} tags", forest.len());
        Ok(Self {
            db,
            forest,
            loaded_version: AtomicI64::new(version),
        })
    }

    pub fn tag_forest(&self) -> &TagForest {
        &self.forest
    }

    /// Replace the in-memory hierarchy with what storage currently holds
    pub async fn reload_tag_hierarchy(&self) -> DomainResult<()> {
        let mut conn = self.db.lock().await;
        self.reload_locked(&mut conn)
    }

    fn reload_locked(&self, conn: &mut Connection) -> DomainResult<()> {
        // Read before loading; a commit in between only causes one more reload
        let version = data_version(conn)?;
        self.forest.reload(load_tags(conn)?)?;
        self.loaded_version.store(version, Ordering::Release);
        log::info!("Tag hierarchy reloaded with {} tags", self.forest.len());
        Ok(())
    }

    /// Reload the hierarchy if another connection committed since the last load
    fn refresh_locked(&self, conn: &mut Connection) -> DomainResult<()> {
        if data_version(conn)? != self.loaded_version.load(Ordering::Acquire) {
            log::debug!("Database changed by another connection, reloading tag hierarchy");
            self.reload_locked(conn)?;
        }
        Ok(())
    }

    /// Run a mutating operation inside one transaction
    pub(super) async fn write<T, F>(&self, f: F) -> DomainResult<T>
    where
        T: Send,
        F: FnOnce(&Transaction<'_>) -> DomainResult<T> + Send,
    {
        let mut conn = self.db.lock().await;
        in_transaction(&mut conn, f)
    }

    /// Run a read-only operation against one snapshot
    pub(super) async fn read<T, F>(&self, f: F) -> DomainResult<T>
    where
        T: Send,
        F: FnOnce(&Transaction<'_>) -> DomainResult<T> + Send,
    {
        let mut conn = self.db.lock().await;
        read_only(&mut conn, f)
    }

    /// Run a tag mutation, then `apply` it to the hierarchy before the
    /// connection is released. A change the hierarchy rejects triggers a
    /// reload from storage.
    pub(super) async fn write_tag<T, F, A>(&self, f: F, apply: A) -> DomainResult<T>
    where
        T: Send,
        F: FnOnce(&Transaction<'_>) -> DomainResult<T> + Send,
        A: FnOnce(&TagForest, &T) -> DomainResult<Arc<Tag>> + Send,
    {
        let mut conn = self.db.lock().await;
        self.refresh_locked(&mut conn)?;

        let value = in_transaction(&mut conn, f)?;
        if let Err(e) = apply(&self.forest, &value) {
            log::warn!("Tag hierarchy out of sync with storage ({}), reloading", e);
            self.reload_locked(&mut conn)?;
        }
        Ok(value)
    }

    /// Resolve a tag in storage and answer `query` from the hierarchy,
    /// both under the same connection lock
    pub(super) async fn read_tag_hierarchy<T, F, Q>(&self, resolve: F, query: Q) -> DomainResult<T>
    where
        T: Send,
        F: FnOnce(&Transaction<'_>) -> DomainResult<Tag> + Send,
        Q: Fn(&TagForest, i64) -> DomainResult<T> + Send,
    {
        let mut conn = self.db.lock().await;
        self.refresh_locked(&mut conn)?;

        let tag = read_only(&mut conn, resolve)?;
        match query(&self.forest, tag.id) {
            Err(e) if e.is_not_found() => {
                self.reload_locked(&mut conn)?;
                query(&self.forest, tag.id)
            }
            result => result,
        }
    }
}

fn load_tags(conn: &mut Connection) -> DomainResult<Vec<Tag>> {
    read_only(conn, |tx| Ok(TagRepository::new(tx).list()?))
}
