//! Clinic authorization and chip verification
//!
//! Covers owner-only clinic registration, signature checks against the
//! authorization store, idempotent verification, and both submission
//! policies.

use assert_matches::assert_matches;
use hpv_core::{Address, ChipId, HpvError, RegistryEvent, SubmissionPolicy};
use hpv_testkit::{clinic_signer, init_tracing, owner, wallet, TestRegistry, GENESIS_TIME};

#[tokio::test]
async fn non_owner_cannot_register_clinic() {
    init_tracing();
    let harness = TestRegistry::new();
    let clinic = Address::repeat(0x42);

    let err = harness
        .registry
        .register_clinic(wallet(7), clinic)
        .await
        .unwrap_err();

    assert_matches!(err, HpvError::Unauthorized { .. });
    assert!(!harness.registry.is_authorized_clinic(&clinic).await.unwrap());
    assert!(harness.sink.events().await.is_empty());
}

#[tokio::test]
async fn clinic_registration_is_idempotent() {
    let harness = TestRegistry::new();
    let clinic = clinic_signer("north").address();

    assert!(harness.registry.register_clinic(owner(), clinic).await.unwrap());
    assert!(!harness.registry.register_clinic(owner(), clinic).await.unwrap());

    assert!(harness.registry.is_authorized_clinic(&clinic).await.unwrap());
    assert_eq!(harness.sink.event_names().await, vec!["ClinicRegistered"]);
}

#[tokio::test]
async fn authorized_clinic_verifies_chip() {
    let harness = TestRegistry::new();
    let clinic = clinic_signer("north");
    let chip = ChipId::repeat(0xaa);

    harness
        .registry
        .register_clinic(owner(), clinic.address())
        .await
        .unwrap();
    let record = harness
        .registry
        .register_vaccination(clinic.address(), chip, &clinic.sign_chip(&chip))
        .await
        .unwrap();

    assert_eq!(record.clinic, clinic.address());
    assert_eq!(record.verified_at, GENESIS_TIME);
    assert!(harness.registry.is_chip_verified(&chip).await.unwrap());

    let events = harness.sink.events().await;
    assert_eq!(
        events.last().map(|e| e.event.clone()),
        Some(RegistryEvent::ChipVerified {
            chip_id: chip,
            clinic: clinic.address(),
            timestamp: GENESIS_TIME,
        })
    );
}

#[tokio::test]
async fn signature_from_unauthorized_clinic_is_rejected() {
    let harness = TestRegistry::new();
    let rogue = clinic_signer("rogue");
    let chip = ChipId::repeat(0xaa);

    let err = harness
        .registry
        .register_vaccination(rogue.address(), chip, &rogue.sign_chip(&chip))
        .await
        .unwrap_err();

    assert_matches!(err, HpvError::UnauthorizedClinic { .. });
    assert!(!harness.registry.is_chip_verified(&chip).await.unwrap());
}

#[tokio::test]
async fn every_registered_clinic_can_verify_and_others_cannot() {
    let harness = TestRegistry::new();

    for (n, label) in ["a", "b", "c", "d"].iter().enumerate() {
        let clinic = clinic_signer(label);
        let chip = ChipId::repeat(n as u8 + 1);
        let signature = clinic.sign_chip(&chip);

        let before = harness
            .registry
            .register_vaccination(clinic.address(), chip, &signature)
            .await;
        assert_matches!(before, Err(HpvError::UnauthorizedClinic { .. }));

        harness
            .registry
            .register_clinic(owner(), clinic.address())
            .await
            .unwrap();
        harness
            .registry
            .register_vaccination(clinic.address(), chip, &signature)
            .await
            .unwrap();
        assert!(harness.registry.is_chip_verified(&chip).await.unwrap());
    }
}

#[tokio::test]
async fn repeated_verification_succeeds_without_second_event() {
    let harness = TestRegistry::new();
    let chip = harness.verify_chip(0xaa).await;
    let first = harness.chip_record(&chip).await;

    harness.clock.advance(60);
    let again = harness
        .registry
        .register_vaccination(harness.clinic.address(), chip, &harness.clinic.sign_chip(&chip))
        .await
        .unwrap();

    assert_eq!(again, first);
    assert!(harness.registry.is_chip_verified(&chip).await.unwrap());
    assert_eq!(
        harness.sink.event_names().await,
        vec!["ClinicRegistered", "ChipVerified"]
    );
}

#[tokio::test]
async fn tampered_signature_is_invalid() {
    let harness = TestRegistry::new();
    let clinic = harness.clinic.address();
    harness.registry.register_clinic(owner(), clinic).await.unwrap();

    let chip = ChipId::repeat(0xaa);
    let mut signature = harness.clinic.sign_chip(&chip);
    signature.signature[0] ^= 0xff;

    let err = harness
        .registry
        .register_vaccination(clinic, chip, &signature)
        .await
        .unwrap_err();
    assert_matches!(err, HpvError::InvalidSignature { .. });
}

#[tokio::test]
async fn signature_over_another_chip_is_invalid() {
    let harness = TestRegistry::new();
    let clinic = harness.clinic.address();
    harness.registry.register_clinic(owner(), clinic).await.unwrap();

    let signature = harness.clinic.sign_chip(&ChipId::repeat(0xbb));
    let err = harness
        .registry
        .register_vaccination(clinic, ChipId::repeat(0xaa), &signature)
        .await
        .unwrap_err();
    assert_matches!(err, HpvError::InvalidSignature { .. });
}

#[tokio::test]
async fn truncated_signature_is_invalid() {
    let harness = TestRegistry::new();
    let clinic = harness.clinic.address();
    harness.registry.register_clinic(owner(), clinic).await.unwrap();

    let chip = ChipId::repeat(0xaa);
    let mut signature = harness.clinic.sign_chip(&chip);
    signature.signature.truncate(10);

    let err = harness
        .registry
        .verify_chip_signature(&chip, &clinic, &signature)
        .await
        .unwrap_err();
    assert_matches!(err, HpvError::InvalidSignature { .. });
}

#[tokio::test]
async fn verify_chip_signature_never_mutates() {
    let harness = TestRegistry::new();
    let clinic = harness.clinic.address();
    harness.registry.register_clinic(owner(), clinic).await.unwrap();
    let before = harness.store.memory().snapshot().await;

    let chip = ChipId::repeat(0xaa);
    harness
        .registry
        .verify_chip_signature(&chip, &clinic, &harness.clinic.sign_chip(&chip))
        .await
        .unwrap();

    assert_eq!(harness.store.memory().snapshot().await, before);
    assert!(!harness.registry.is_chip_verified(&chip).await.unwrap());
}

#[tokio::test]
async fn clinic_only_policy_rejects_relayed_signature() {
    let harness = TestRegistry::builder()
        .policy(SubmissionPolicy::ClinicOnly)
        .build();
    let clinic = harness.clinic.address();
    harness.registry.register_clinic(owner(), clinic).await.unwrap();

    let chip = ChipId::repeat(0xaa);
    let err = harness
        .registry
        .register_vaccination(wallet(1), chip, &harness.clinic.sign_chip(&chip))
        .await
        .unwrap_err();

    assert_matches!(err, HpvError::InvalidSignature { .. });
    assert!(!harness.registry.is_chip_verified(&chip).await.unwrap());
}

#[tokio::test]
async fn any_submitter_policy_accepts_relayed_signature() {
    let harness = TestRegistry::builder()
        .policy(SubmissionPolicy::AnySubmitter)
        .build();
    let clinic = harness.clinic.address();
    harness.registry.register_clinic(owner(), clinic).await.unwrap();

    let chip = ChipId::repeat(0xaa);
    let record = harness
        .registry
        .register_vaccination(wallet(1), chip, &harness.clinic.sign_chip(&chip))
        .await
        .unwrap();

    assert_eq!(record.clinic, clinic);
    let events = harness.sink.events().await;
    assert_eq!(events.last().map(|e| e.origin), Some(wallet(1)));
}

#[tokio::test]
async fn any_submitter_policy_still_requires_authorized_signer() {
    let harness = TestRegistry::builder()
        .policy(SubmissionPolicy::AnySubmitter)
        .build();
    let rogue = clinic_signer("rogue");
    let chip = ChipId::repeat(0xaa);

    let err = harness
        .registry
        .register_vaccination(wallet(1), chip, &rogue.sign_chip(&chip))
        .await
        .unwrap_err();
    assert_matches!(err, HpvError::UnauthorizedClinic { .. });
}
