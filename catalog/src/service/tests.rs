//! Service Integration Tests
//!
//! End-to-end tests of the catalog service against an in-memory database.

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::domain::{
        BusinessObjectDefinitionCreateRequest, BusinessObjectDefinitionKey,
        BusinessObjectDefinitionTagKey, BusinessObjectDefinitionUpdateRequest, TagCreateRequest,
        TagKey, TagTypeCreateRequest, TagTypeKey, TagUpdateRequest,
    };
    use crate::repository::init_db;
    use crate::service::{
        BusinessObjectDefinitionService, CatalogService, NamespaceService, TagService,
        TagTypeService,
    };

    const NAMESPACE: &str = "Namespace_1";
    const NAMESPACE_2: &str = "Namespace_2";
    const DATA_PROVIDER_NAME: &str = "Data_Provider";
    const TAG_TYPE: &str = "REGION";

    async fn setup_service() -> CatalogService {
        let db = init_db(&PathBuf::from(":memory:"), Duration::from_millis(100))
            .expect("Failed to init test DB");
        CatalogService::open(db).await.expect("Failed to open service")
    }

    async fn create_bdef(service: &CatalogService, namespace: &str, name: &str) {
        if service.get_namespace(namespace).await.is_err() {
            service.create_namespace(namespace).await.unwrap();
        }
        service
            .create_business_object_definition(BusinessObjectDefinitionCreateRequest::new(
                namespace,
                name,
                DATA_PROVIDER_NAME,
            ))
            .await
            .unwrap();
    }

    /// REGION with tags US -> US_EAST -> NYC and US -> US_WEST
    async fn create_region_tags(service: &CatalogService) {
        service
            .create_tag_type(TagTypeCreateRequest::new(TAG_TYPE, "Region", 1))
            .await
            .unwrap();
        let us = TagKey::new(TAG_TYPE, "US");
        let us_east = TagKey::new(TAG_TYPE, "US_EAST");
        for request in [
            TagCreateRequest::new(us.clone(), "United States"),
            TagCreateRequest::new(us_east.clone(), "US East").with_parent(us.clone()),
            TagCreateRequest::new(TagKey::new(TAG_TYPE, "US_WEST"), "US West").with_parent(us),
            TagCreateRequest::new(TagKey::new(TAG_TYPE, "NYC"), "New York").with_parent(us_east),
        ] {
            service.create_tag(request).await.unwrap();
        }
    }

    fn bdef_tag(namespace: &str, name: &str, tag_code: &str) -> BusinessObjectDefinitionTagKey {
        BusinessObjectDefinitionTagKey {
            business_object_definition_key: BusinessObjectDefinitionKey::new(namespace, name),
            tag_key: TagKey::new(TAG_TYPE, tag_code),
        }
    }

    #[tokio::test]
    async fn test_create_bdef_already_exists_keeps_existing_row() {
        let service = setup_service().await;
        service.create_namespace(NAMESPACE).await.unwrap();
        let first = service
            .create_business_object_definition(
                BusinessObjectDefinitionCreateRequest::new(NAMESPACE, "Bdef", DATA_PROVIDER_NAME)
                    .with_description("first"),
            )
            .await
            .unwrap();

        let err = service
            .create_business_object_definition(
                BusinessObjectDefinitionCreateRequest::new("namespace_1", "BDEF", "Other")
                    .with_description("second"),
            )
            .await
            .unwrap_err();
        assert!(err.is_already_exists());
        assert!(err.to_string().contains("because it already exists for namespace"));

        let stored = service
            .get_business_object_definition(BusinessObjectDefinitionKey::new(NAMESPACE, "Bdef"))
            .await
            .unwrap();
        assert_eq!(stored, first);
        assert_eq!(
            service.get_business_object_definition_keys(None).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_create_bdef_validation() {
        let service = setup_service().await;
        service.create_namespace(NAMESPACE).await.unwrap();

        let err = service
            .create_business_object_definition(BusinessObjectDefinitionCreateRequest::new(
                "  ",
                "Bdef",
                DATA_PROVIDER_NAME,
            ))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: A namespace must be specified.");

        let err = service
            .create_business_object_definition(BusinessObjectDefinitionCreateRequest::new(
                NAMESPACE, "Bdef", "",
            ))
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());

        let err = service
            .create_business_object_definition(BusinessObjectDefinitionCreateRequest::new(
                "Missing", "Bdef", DATA_PROVIDER_NAME,
            ))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(service.get_business_object_definition_keys(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_bdef_trims_input() {
        let service = setup_service().await;
        service.create_namespace(NAMESPACE).await.unwrap();

        let bdef = service
            .create_business_object_definition(BusinessObjectDefinitionCreateRequest::new(
                " Namespace_1 ",
                "  Bdef  ",
                " Data_Provider ",
            ))
            .await
            .unwrap();
        assert_eq!(bdef.namespace, NAMESPACE);
        assert_eq!(bdef.business_object_definition_name, "Bdef");
        assert_eq!(bdef.data_provider_name, DATA_PROVIDER_NAME);
    }

    #[tokio::test]
    async fn test_get_bdef_any_casing() {
        let service = setup_service().await;
        create_bdef(&service, NAMESPACE, "Bdef_Name").await;

        for (namespace, name) in [
            ("Namespace_1", "Bdef_Name"),
            ("NAMESPACE_1", "BDEF_NAME"),
            ("namespace_1", "bdef_name"),
        ] {
            let bdef = service
                .get_business_object_definition(BusinessObjectDefinitionKey::new(namespace, name))
                .await
                .unwrap();
            assert_eq!(bdef.business_object_definition_name, "Bdef_Name");
        }

        let err = service
            .get_business_object_definition(BusinessObjectDefinitionKey::new(NAMESPACE, "Other"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Not found: Business object definition with name \"Other\" doesn't exist for namespace \"Namespace_1\"."
        );
    }

    #[tokio::test]
    async fn test_update_bdef() {
        let service = setup_service().await;
        create_bdef(&service, NAMESPACE, "Bdef").await;

        let updated = service
            .update_business_object_definition(
                BusinessObjectDefinitionKey::new("NAMESPACE_1", "bdef"),
                BusinessObjectDefinitionUpdateRequest {
                    description: Some(" New description ".to_string()),
                    display_name: Some("Bdef Display".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.namespace, NAMESPACE);
        assert_eq!(updated.business_object_definition_name, "Bdef");
        assert_eq!(updated.description.as_deref(), Some("New description"));
        assert_eq!(updated.display_name.as_deref(), Some("Bdef Display"));
    }

    #[tokio::test]
    async fn test_get_bdef_keys_by_namespace() {
        let service = setup_service().await;
        create_bdef(&service, NAMESPACE, "A").await;
        create_bdef(&service, NAMESPACE, "B").await;
        create_bdef(&service, NAMESPACE_2, "C").await;

        assert_eq!(service.get_business_object_definition_keys(None).await.unwrap().len(), 3);
        assert_eq!(
            service.get_business_object_definition_keys(Some("   ")).await.unwrap().len(),
            3
        );
        assert_eq!(
            service
                .get_business_object_definition_keys(Some("namespace_1"))
                .await
                .unwrap(),
            vec![
                BusinessObjectDefinitionKey::new(NAMESPACE, "A"),
                BusinessObjectDefinitionKey::new(NAMESPACE, "B"),
            ]
        );
        assert!(service
            .get_business_object_definition_keys(Some("Missing"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_tag_type_case_sensitive_keys() {
        let service = setup_service().await;

        service
            .create_tag_type(TagTypeCreateRequest::new("REGION", "Region", 1))
            .await
            .unwrap();
        service
            .create_tag_type(TagTypeCreateRequest::new("region", "Region (lower)", 2))
            .await
            .unwrap();

        let err = service
            .create_tag_type(TagTypeCreateRequest::new("REGION", "Again", 3))
            .await
            .unwrap_err();
        assert!(err.is_already_exists());

        let err = service
            .create_tag_type(TagTypeCreateRequest::new(" REGION ", "Padded", 4))
            .await
            .unwrap_err();
        assert!(err.is_already_exists());

        assert_eq!(
            service.get_tag_types().await.unwrap(),
            vec![TagTypeKey::new("REGION"), TagTypeKey::new("region")]
        );
        assert_eq!(
            service
                .get_tag_type(TagTypeKey::new("region"))
                .await
                .unwrap()
                .display_name,
            "Region (lower)"
        );
    }

    #[tokio::test]
    async fn test_delete_tag_type_with_tags_fails() {
        let service = setup_service().await;
        create_region_tags(&service).await;

        let err = service
            .delete_tag_type(TagTypeKey::new(TAG_TYPE))
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert!(service.get_tag_type(TagTypeKey::new(TAG_TYPE)).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_tag_checks() {
        let service = setup_service().await;
        create_region_tags(&service).await;

        // duplicate, ignoring case
        let err = service
            .create_tag(TagCreateRequest::new(TagKey::new(TAG_TYPE, "us"), "Dup"))
            .await
            .unwrap_err();
        assert!(err.is_already_exists());

        // unknown tag type
        let err = service
            .create_tag(TagCreateRequest::new(TagKey::new("COLOR", "RED"), "Red"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        // unknown parent
        let err = service
            .create_tag(
                TagCreateRequest::new(TagKey::new(TAG_TYPE, "EU"), "Europe")
                    .with_parent(TagKey::new(TAG_TYPE, "WORLD")),
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        // parent of another tag type
        service
            .create_tag_type(TagTypeCreateRequest::new("COLOR", "Color", 2))
            .await
            .unwrap();
        let err = service
            .create_tag(
                TagCreateRequest::new(TagKey::new("COLOR", "RED"), "Red")
                    .with_parent(TagKey::new(TAG_TYPE, "US")),
            )
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());

        assert_eq!(service.get_tags(TAG_TYPE).await.unwrap().len(), 4);
        assert!(service.get_tags("COLOR").await.unwrap().is_empty());
        assert_eq!(service.tag_forest().len(), 4);
    }

    #[tokio::test]
    async fn test_tag_with_descendants_and_ancestors() {
        let service = setup_service().await;
        create_region_tags(&service).await;

        let codes: Vec<String> = service
            .get_tag_with_descendants(TagKey::new(TAG_TYPE, "us"))
            .await
            .unwrap()
            .iter()
            .map(|t| t.tag_code.clone())
            .collect();
        assert_eq!(codes.len(), 4);
        assert_eq!(codes[0], "US");
        assert!(codes.contains(&"NYC".to_string()));

        let ancestors: Vec<String> = service
            .get_tag_ancestors(TagKey::new(TAG_TYPE, "NYC"))
            .await
            .unwrap()
            .iter()
            .map(|t| t.tag_code.clone())
            .collect();
        assert_eq!(ancestors, vec!["US_EAST", "US"]);
    }

    #[tokio::test]
    async fn test_update_tag_rejects_cycle() {
        let service = setup_service().await;
        create_region_tags(&service).await;

        let err = service
            .update_tag(
                TagKey::new(TAG_TYPE, "US"),
                TagUpdateRequest {
                    display_name: "United States".to_string(),
                    description: None,
                    parent_tag_key: Some(TagKey::new(TAG_TYPE, "NYC")),
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());

        let err = service
            .update_tag(
                TagKey::new(TAG_TYPE, "US"),
                TagUpdateRequest {
                    display_name: "United States".to_string(),
                    description: None,
                    parent_tag_key: Some(TagKey::new(TAG_TYPE, "US")),
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());

        let us = service.get_tag(TagKey::new(TAG_TYPE, "US")).await.unwrap();
        assert!(us.is_root());
    }

    #[tokio::test]
    async fn test_update_tag_reparents() {
        let service = setup_service().await;
        create_region_tags(&service).await;

        let nyc = service
            .update_tag(
                TagKey::new(TAG_TYPE, "NYC"),
                TagUpdateRequest {
                    display_name: "NYC".to_string(),
                    description: Some("Big apple".to_string()),
                    parent_tag_key: Some(TagKey::new(TAG_TYPE, "US_WEST")),
                },
            )
            .await
            .unwrap();
        let us_west = service.get_tag(TagKey::new(TAG_TYPE, "US_WEST")).await.unwrap();
        assert_eq!(nyc.parent_tag_id, Some(us_west.id));

        let east = service
            .get_tag_with_descendants(TagKey::new(TAG_TYPE, "US_EAST"))
            .await
            .unwrap();
        assert_eq!(east.len(), 1);
        let west = service
            .get_tag_with_descendants(TagKey::new(TAG_TYPE, "US_WEST"))
            .await
            .unwrap();
        assert_eq!(west.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_tag() {
        let service = setup_service().await;
        create_region_tags(&service).await;
        create_bdef(&service, NAMESPACE, "Bdef").await;

        let err = service.delete_tag(TagKey::new(TAG_TYPE, "US")).await.unwrap_err();
        assert!(err.is_invalid_input());

        service
            .create_business_object_definition_tag(bdef_tag(NAMESPACE, "Bdef", "NYC"))
            .await
            .unwrap();
        let err = service.delete_tag(TagKey::new(TAG_TYPE, "NYC")).await.unwrap_err();
        assert!(err.is_invalid_input());

        service
            .delete_business_object_definition_tag(bdef_tag(NAMESPACE, "Bdef", "NYC"))
            .await
            .unwrap();
        service.delete_tag(TagKey::new(TAG_TYPE, "nyc")).await.unwrap();
        assert!(service
            .get_tag(TagKey::new(TAG_TYPE, "NYC"))
            .await
            .unwrap_err()
            .is_not_found());
        assert_eq!(service.tag_forest().len(), 3);
    }

    #[tokio::test]
    async fn test_bdefs_by_tags_are_deduplicated() {
        let service = setup_service().await;
        create_region_tags(&service).await;
        for name in ["A", "B", "C", "D"] {
            create_bdef(&service, NAMESPACE, name).await;
        }
        for name in ["A", "B", "C", "D"] {
            for tag in ["US", "US_EAST", "NYC"] {
                service
                    .create_business_object_definition_tag(bdef_tag(NAMESPACE, name, tag))
                    .await
                    .unwrap();
            }
        }

        let found = service
            .get_business_object_definitions_by_tags(vec![
                TagKey::new(TAG_TYPE, "US"),
                TagKey::new(TAG_TYPE, "us_east"),
                TagKey::new(TAG_TYPE, "NYC"),
            ])
            .await
            .unwrap();
        assert_eq!(found.len(), 4);

        // no descendant expansion
        let found = service
            .get_business_object_definitions_by_tags(vec![TagKey::new(TAG_TYPE, "US_WEST")])
            .await
            .unwrap();
        assert!(found.is_empty());

        // no tags means every definition
        let found = service.get_business_object_definitions_by_tags(vec![]).await.unwrap();
        assert_eq!(found.len(), 4);

        let err = service
            .get_business_object_definitions_by_tags(vec![TagKey::new(TAG_TYPE, "MARS")])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_bdef_tag_fails() {
        let service = setup_service().await;
        create_region_tags(&service).await;
        create_bdef(&service, NAMESPACE, "Bdef").await;

        let created = service
            .create_business_object_definition_tag(bdef_tag("NAMESPACE_1", "bdef", "us"))
            .await
            .unwrap();
        assert_eq!(created.business_object_definition_key.namespace, NAMESPACE);
        assert_eq!(created.tag_key, TagKey::new(TAG_TYPE, "US"));

        let err = service
            .create_business_object_definition_tag(bdef_tag(NAMESPACE, "Bdef", "US"))
            .await
            .unwrap_err();
        assert!(err.is_already_exists());

        assert_eq!(
            service
                .get_business_object_definition_tags(BusinessObjectDefinitionKey::new(NAMESPACE, "Bdef"))
                .await
                .unwrap(),
            vec![TagKey::new(TAG_TYPE, "US")]
        );

        let err = service
            .delete_business_object_definition_tag(bdef_tag(NAMESPACE, "Bdef", "NYC"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_bdef_removes_tag_links() {
        let service = setup_service().await;
        create_region_tags(&service).await;
        create_bdef(&service, NAMESPACE, "Bdef").await;
        service
            .create_business_object_definition_tag(bdef_tag(NAMESPACE, "Bdef", "US"))
            .await
            .unwrap();

        service
            .delete_business_object_definition(BusinessObjectDefinitionKey::new(NAMESPACE, "Bdef"))
            .await
            .unwrap();

        // the tag is free to delete once the link is gone
        service.delete_tag(TagKey::new(TAG_TYPE, "NYC")).await.unwrap();
        let found = service
            .get_business_object_definitions_by_tags(vec![TagKey::new(TAG_TYPE, "US")])
            .await
            .unwrap();
        assert!(found.is_empty());

        // the namespace can go once it is empty
        service.delete_namespace(NAMESPACE).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_namespace_with_bdefs_fails() {
        let service = setup_service().await;
        create_bdef(&service, NAMESPACE, "Bdef").await;

        let err = service.delete_namespace("namespace_1").await.unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(service.get_namespaces().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reload_tag_hierarchy_sees_external_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");

        let first = CatalogService::open(init_db(&path, Duration::from_secs(1)).unwrap())
            .await
            .unwrap();
        let second = CatalogService::open(init_db(&path, Duration::from_secs(1)).unwrap())
            .await
            .unwrap();
        create_region_tags(&first).await;
        assert!(second.tag_forest().is_empty());

        // the commit from the other connection triggers a reload
        let tags = second
            .get_tag_with_descendants(TagKey::new(TAG_TYPE, "US"))
            .await
            .unwrap();
        assert_eq!(tags.len(), 4);
        assert_eq!(second.tag_forest().len(), 4);
    }

    #[tokio::test]
    async fn test_hierarchy_sees_descendants_added_elsewhere() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");

        let first = CatalogService::open(init_db(&path, Duration::from_secs(1)).unwrap())
            .await
            .unwrap();
        let second = CatalogService::open(init_db(&path, Duration::from_secs(1)).unwrap())
            .await
            .unwrap();

        first
            .create_tag_type(TagTypeCreateRequest::new(TAG_TYPE, "Region", 1))
            .await
            .unwrap();
        let us = TagKey::new(TAG_TYPE, "US");
        first
            .create_tag(TagCreateRequest::new(us.clone(), "United States"))
            .await
            .unwrap();
        assert_eq!(second.get_tag_with_descendants(us.clone()).await.unwrap().len(), 1);

        first
            .create_tag(
                TagCreateRequest::new(TagKey::new(TAG_TYPE, "US_EAST"), "US East")
                    .with_parent(us.clone()),
            )
            .await
            .unwrap();
        assert_eq!(second.get_tag_with_descendants(us).await.unwrap().len(), 2);

        let ancestors = second
            .get_tag_ancestors(TagKey::new(TAG_TYPE, "US_EAST"))
            .await
            .unwrap();
        assert_eq!(ancestors.len(), 1);
        assert_eq!(ancestors[0].tag_code, "US");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reparent_keeps_hierarchy_in_step() {
        let service = Arc::new(setup_service().await);
        create_region_tags(&service).await;

        let mut handles = Vec::new();
        for i in 0..40 {
            let service = Arc::clone(&service);
            let parent = if i % 2 == 0 { "US_EAST" } else { "US_WEST" };
            handles.push(tokio::spawn(async move {
                service
                    .update_tag(
                        TagKey::new(TAG_TYPE, "NYC"),
                        TagUpdateRequest {
                            display_name: "New York".to_string(),
                            description: Some(format!("move {}", i)),
                            parent_tag_key: Some(TagKey::new(TAG_TYPE, parent)),
                        },
                    )
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stored = service.get_tag(TagKey::new(TAG_TYPE, "NYC")).await.unwrap();
        let in_memory = service.tag_forest().get(stored.id).unwrap();
        assert_eq!(*in_memory, stored);

        let parent_id = stored.parent_tag_id.unwrap();
        let siblings = service.tag_forest().descendants_and_self(parent_id).unwrap();
        assert!(siblings.iter().any(|t| t.id == stored.id));
    }
}
