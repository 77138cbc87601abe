mod common;

use access_lifecycle::config::{AccessConfig, StorageConfig};
use access_lifecycle::embargo::Embargo;
use access_lifecycle::lease::Lease;
use access_lifecycle::permissions::{AccessMode, Agent, PermissionManager};
use access_lifecycle::resource::{AccessControl, LegacyResource, Resource};
use access_lifecycle::services::{AccessService, ChangeDepositorService, ReleasePolicy, ReleaseService};
use access_lifecycle::store::{AccessContext, SledStore};
use access_lifecycle::visibility::Visibility;
use chrono::{Duration, Utc};
use common::{flaky_context, test_now, work_with_file_sets};
use std::io::Write as _;
use std::sync::Arc;
use tempfile::{tempdir, NamedTempFile};

#[test]
fn test_change_depositor_on_managed_work() {
    let (ctx, _) = flaky_context();
    let (mut work, file_sets) = work_with_file_sets(&ctx, 2);
    work.set_depositor("dana");
    work.set_visibility(Visibility::Open, &ctx).unwrap();

    ChangeDepositorService::new(ctx.clone())
        .call(&mut work, "erin", true)
        .unwrap();

    let stored = ctx.queries().find_resource(&work.id).unwrap();
    assert_eq!(stored.depositor(), Some("erin"));
    assert_eq!(stored.proxy_depositor(), Some("dana"));
    assert_eq!(stored.visibility(&ctx).unwrap(), Visibility::Restricted);
    for file_set in &file_sets {
        let permissions = PermissionManager::for_resource(&file_set.id, &ctx).unwrap();
        assert_eq!(permissions.edit_users().into_iter().collect::<Vec<_>>(), vec!["erin"]);
    }
}

#[test]
fn test_change_depositor_on_legacy_work() {
    let (ctx, _) = flaky_context();
    let mut file_set = LegacyResource::file_set();
    file_set.grant(AccessMode::Read, Agent::user("frank"));
    file_set.persist(&ctx).unwrap();
    let mut work = LegacyResource::work().with_members(vec![file_set.id.clone()]);
    work.set_depositor("frank");
    work.persist(&ctx).unwrap();

    ChangeDepositorService::new(ctx.clone())
        .call(&mut work, "gina", false)
        .unwrap();

    let stored = ctx.queries().find_legacy(&file_set.id).unwrap();
    assert_eq!(stored.depositor(), Some("gina"));
    assert_eq!(stored.permissions.len(), 2);
    assert_eq!(work.proxy_depositor(), Some("frank"));
}

#[test]
fn test_release_service_handles_both_kinds() {
    let (ctx, _) = flaky_context();
    let service = AccessService::new(ctx.clone());
    let work = Resource::work();
    ctx.persister().save_resource(&work).unwrap();
    service
        .attach_embargo(
            &work.id,
            Embargo::new(test_now() - Duration::days(1), Visibility::Restricted, Visibility::Open),
        )
        .unwrap();

    let mut legacy = LegacyResource::work();
    legacy.embargo = Some(Embargo::new(
        test_now() - Duration::days(1),
        Visibility::Restricted,
        Visibility::Open,
    ));

    let release = ReleaseService::new(ctx.clone());
    let mut managed = ctx.queries().find_resource(&work.id).unwrap();
    assert!(release
        .destroy_embargo(&mut managed, ReleasePolicy::OnlyIfLapsed)
        .unwrap());
    assert!(release
        .destroy_embargo(&mut legacy, ReleasePolicy::OnlyIfLapsed)
        .unwrap());

    assert_eq!(managed.visibility(&ctx).unwrap(), Visibility::Open);
    assert_eq!(AccessControl::visibility(&legacy, &ctx).unwrap(), Visibility::Open);
    assert!(managed.embargo_id.is_none());
    assert!(legacy.embargo.as_ref().unwrap().is_released());
}

#[test]
fn test_access_service_over_sled() {
    let dir = tempdir().unwrap();
    let store = Arc::new(SledStore::open(dir.path().join("db")).unwrap());
    let service = AccessService::new(AccessContext::with_store(store));
    let (work, file_sets) = work_with_file_sets(service.context(), 2);

    service.set_visibility(&work.id, Visibility::Authenticated).unwrap();
    let now = Utc::now();
    service
        .attach_lease(&work.id, Lease::new(now + Duration::days(3), Visibility::Restricted))
        .unwrap();
    let report = service.propagate_visibility(&work.id).unwrap();
    assert_eq!(report.len(), 2);

    for file_set in &file_sets {
        assert_eq!(service.visibility_of(&file_set.id).unwrap(), Visibility::Lease);
    }
    assert!(service.expire_lease(&work.id, ReleasePolicy::Always).unwrap());
    assert_eq!(service.visibility_of(&work.id).unwrap(), Visibility::Restricted);
    assert_eq!(
        service.visibility_of(&file_sets[0].id).unwrap(),
        Visibility::Lease
    );

    service.propagate_visibility(&work.id).unwrap();
    for file_set in &file_sets {
        assert_eq!(
            service.visibility_of(&file_set.id).unwrap(),
            Visibility::Restricted
        );
        let stored = service.context().queries().find_resource(&file_set.id).unwrap();
        assert!(stored.lease_id.is_none());
    }
}

#[test]
fn test_context_from_toml_file() {
    let dir = tempdir().unwrap();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "public_group = \"anyone\"\nregistered_group = \"members\"\n\n[storage]\ntype = \"sled\"\npath = {:?}\n",
        dir.path().join("access").to_string_lossy()
    )
    .unwrap();

    let config = AccessConfig::from_file(file.path()).unwrap();
    assert!(matches!(config.storage, StorageConfig::Sled { .. }));

    let service = AccessService::from_config(&config).unwrap();
    let work = Resource::work();
    service.context().persister().save_resource(&work).unwrap();
    service
        .grant_access(&work.id, Agent::group("anyone"), AccessMode::Read)
        .unwrap();
    assert_eq!(service.visibility_of(&work.id).unwrap(), Visibility::Open);
}

#[test]
fn test_missing_config_file() {
    let err = AccessConfig::from_file("/nonexistent/access.toml").unwrap_err();
    assert!(matches!(err, access_lifecycle::error::AccessError::Io(_)));
}
