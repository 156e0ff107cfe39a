mod common;

use common::harness;
use logtrail_canonical::merkle;
use logtrail_personality::memory::Integration;
use logtrail_personality::{
    form_leaf, ErrorKind, LogServiceError, PersonalityError, RequestContext,
};

#[tokio::test]
async fn inclusion_proof_verifies_against_the_checkpoint() {
    let h = harness(10, Integration::Immediate);
    h.log.insert_integrated("hello");
    let ctx = RequestContext::new();

    let checkpoint = h.personality.checkpoint(&ctx).await.unwrap();
    let proof = h
        .personality
        .prove_inclusion(&ctx, checkpoint.size, "hello")
        .await
        .unwrap();

    assert_eq!(checkpoint.size, 11);
    assert_eq!(proof.leaf_index, 10);
    assert!(!proof.hashes.is_empty());
    // ceil(log2(11)) + 1
    assert!(proof.hashes.len() <= 5);
    merkle::verify_inclusion(&form_leaf("hello").leaf_hash, &proof, &checkpoint.root_hash)
        .unwrap();
}

#[tokio::test]
async fn earlier_entries_prove_against_later_sizes() {
    let h = harness(16, Integration::Immediate);
    let ctx = RequestContext::new();
    let root = h.log.root_hash();

    for i in [0usize, 7, 15] {
        let entry = format!("entry-{}", i);
        let proof = h.personality.prove_inclusion(&ctx, 16, entry.clone()).await.unwrap();
        assert_eq!(proof.leaf_index, i as u64);
        merkle::verify_inclusion(&form_leaf(entry).leaf_hash, &proof, &root).unwrap();
    }
}

#[tokio::test]
async fn absent_entry_is_a_range_error() {
    let h = harness(11, Integration::Immediate);
    let err = h
        .personality
        .prove_inclusion(&RequestContext::new(), 11, "never appended")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Range);
    assert!(err.is_leaf_not_found());
}

#[tokio::test]
async fn entry_beyond_the_requested_size_is_not_found() {
    let h = harness(10, Integration::Immediate);
    h.log.insert_integrated("hello");

    let err = h
        .personality
        .prove_inclusion(&RequestContext::new(), 10, "hello")
        .await
        .unwrap_err();

    assert!(err.is_leaf_not_found());
}

#[tokio::test]
async fn size_beyond_the_tree_is_out_of_range() {
    let h = harness(11, Integration::Immediate);
    let err = h
        .personality
        .prove_inclusion(&RequestContext::new(), 50, "entry-1")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PersonalityError::Range(LogServiceError::OutOfRange {
            requested: 50,
            tree_size: 11
        })
    ));
}

#[tokio::test]
async fn duplicate_leaves_resolve_to_the_lowest_index() {
    let h = harness(0, Integration::Immediate);
    h.log.insert_integrated("x");
    h.log.insert_integrated("y");
    h.log.insert_integrated("x");
    h.log.insert_integrated("z");

    let proof = h
        .personality
        .prove_inclusion(&RequestContext::new(), 4, "x")
        .await
        .unwrap();

    assert_eq!(proof.leaf_index, 0);
    merkle::verify_inclusion(&form_leaf("x").leaf_hash, &proof, &h.log.root_hash()).unwrap();
}

#[tokio::test]
async fn update_at_current_size_skips_the_consistency_query() {
    let h = harness(10, Integration::Immediate);

    let (signed, proof) = h
        .personality
        .update_checkpoint(&RequestContext::new(), 10)
        .await
        .unwrap();

    assert!(proof.is_none());
    assert_eq!(h.open(&signed).size, 10);
    assert!(h.log.consistency_requests().is_empty());
}

#[tokio::test]
async fn update_from_older_size_proves_consistency() {
    let h = harness(10, Integration::Immediate);
    let old_root = h.log.root_hash();
    for i in 0..5 {
        h.log.insert_integrated(format!("later-{}", i));
    }

    let (signed, proof) = h
        .personality
        .update_checkpoint(&RequestContext::new(), 10)
        .await
        .unwrap();

    let checkpoint = h.open(&signed);
    let proof = proof.expect("tree grew");
    assert_eq!(checkpoint.size, 15);
    assert_eq!((proof.from_size, proof.to_size), (10, 15));
    assert_eq!(h.log.consistency_requests(), vec![(10, 15)]);
    merkle::verify_consistency(&proof, &old_root, &checkpoint.root_hash).unwrap();
}

#[tokio::test]
async fn update_from_empty_tree_passes_an_empty_proof_through() {
    let h = harness(3, Integration::Immediate);

    let (_, proof) = h
        .personality
        .update_checkpoint(&RequestContext::new(), 0)
        .await
        .unwrap();

    let proof = proof.expect("tree grew from empty");
    assert_eq!((proof.from_size, proof.to_size), (0, 3));
    assert!(proof.hashes.is_empty());
}

#[tokio::test]
async fn update_from_larger_size_is_an_integrity_error() {
    let h = harness(5, Integration::Immediate);

    let err = h
        .personality
        .update_checkpoint(&RequestContext::new(), 10)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PersonalityError::Integrity {
            previous: 10,
            observed: 5
        }
    ));
    assert!(h.log.consistency_requests().is_empty());
}

#[tokio::test]
async fn update_surfaces_fetch_failures() {
    let h = harness(5, Integration::Immediate);
    h.log
        .fail_next_root(LogServiceError::Unavailable("no route to host".into()));

    let err = h
        .personality
        .update_checkpoint(&RequestContext::new(), 2)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connectivity);
}
