// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::resource::Resource;

#[test]
fn credential_is_unreachable_after_soft_delete() {
    assert!(!Credential::REACHABLE_WHEN_DELETED);
    assert!(LegalEntity::REACHABLE_WHEN_DELETED);
}

#[test]
fn shared_secret_is_salted() {
    let identity = IdentityId::new();
    let a = Credential::shared_secret(identity, "hunter2");
    let b = Credential::shared_secret(identity, "hunter2");
    let (CredentialPayload::SharedSecret { secret_hash: ha, .. },
         CredentialPayload::SharedSecret { secret_hash: hb, .. }) = (&a.payload, &b.payload)
    else {
        panic!("expected shared-secret payloads");
    };
    // Fresh salt per credential: same secret, different hashes.
    assert_ne!(ha, hb);
}

#[test]
fn shared_secret_verifies_the_original_only() {
    let cred = Credential::shared_secret(IdentityId::new(), "hunter2");
    assert!(cred.matches_secret("hunter2"));
    assert!(!cred.matches_secret("hunter3"));

    let cert = Credential::client_certificate(IdentityId::new(), vec![1]);
    assert!(!cert.matches_secret("hunter2"));
}

#[test]
fn client_certificate_fingerprint_is_stable() {
    let identity = IdentityId::new();
    let cred = Credential::client_certificate(identity, vec![1, 2, 3]);
    let CredentialPayload::ClientCertificate { fingerprint, certificate_der } = &cred.payload
    else {
        panic!("expected client-certificate payload");
    };
    assert_eq!(certificate_der, &vec![1, 2, 3]);
    assert_eq!(fingerprint, &crate::etag::sha256_hex(&[1, 2, 3]));
}

#[test]
fn membership_key_is_per_source_system() {
    let group = GroupId::from_string("group:g");
    let identity = IdentityId::from_string("identity:i");
    let a = GroupMembership::key(group, identity, "api");
    let b = GroupMembership::key(group, identity, "scim");
    assert_ne!(a, b);
}

#[test]
fn grant_dedup_key_coalesces_the_grantee() {
    let identity = IdentityId::from_string("identity:i");
    let group = GroupId::from_string("group:g");
    let target = LegalEntityId::from_string("legal_entity:l");
    let granted_by = IdentityId::new();
    let op = Operation::read(crate::id::ResourceKind::Repo);

    let by_identity = Grant::new(Grantee::Identity(identity), op, target, granted_by);
    let by_group = Grant::new(Grantee::Group(group), op, target, granted_by);
    assert_ne!(by_identity.dedup_key(), by_group.dedup_key());

    let again = Grant::new(Grantee::Identity(identity), op, target, IdentityId::new());
    // granted_by does not participate in uniqueness
    assert_eq!(by_identity.dedup_key(), again.dedup_key());
}

#[yare::parameterized(
    create = { Verb::Create, "create" },
    read = { Verb::Read, "read" },
    update = { Verb::Update, "update" },
    delete = { Verb::Delete, "delete" },
)]
fn verb_display(verb: Verb, s: &str) {
    assert_eq!(verb.to_string(), s);
}

#[test]
fn standard_groups_include_runner() {
    assert!(STANDARD_GROUPS.contains(&RUNNER_GROUP));
    assert_eq!(STANDARD_GROUPS.len(), 4);
}
