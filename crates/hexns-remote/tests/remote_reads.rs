use hexns_primitives::identity;
use hexns_primitives::{U256, WalletId};
use hexns_remote::{Config, Error, RemoteReader, TransportError};
use hexns_test_service::{RemoteStoreSim, SimulatedGateway, UnreachableGateway, test_wallet};
use std::sync::Arc;

fn reader_for(sim: &RemoteStoreSim) -> (RemoteReader, Arc<SimulatedGateway>) {
    let gateway = Arc::new(SimulatedGateway::new(sim.storage()));
    let reader = RemoteReader::new(
        Config { target: test_wallet(0x99) },
        gateway.clone(),
    );
    (reader, gateway)
}

#[tokio::test]
async fn reads_records_the_remote_store_committed() {
    let sim = RemoteStoreSim::new();
    let (reader, _) = reader_for(&sim);
    let node = identity::namehash("alice.eth");
    let wallet = test_wallet(0xaa);

    sim.set_addr(node, wallet);
    sim.set_addr_coin(node, U256::from(0u64), &[0x00, 0x14, 0x75, 0x1e]);
    sim.set_text(node, "url", "https://alice.example");
    sim.set_contenthash(node, &[0xe3, 0x01, 0x01, 0x70, 0x12, 0x20]);

    assert_eq!(reader.addr(node).await.unwrap(), wallet);
    assert_eq!(
        reader.addr_coin(node, U256::from(0u64)).await.unwrap(),
        vec![0x00, 0x14, 0x75, 0x1e],
    );
    assert_eq!(reader.text(node, "url").await.unwrap(), "https://alice.example");
    assert_eq!(
        reader.contenthash(node).await.unwrap(),
        vec![0xe3, 0x01, 0x01, 0x70, 0x12, 0x20],
    );
}

#[tokio::test]
async fn long_values_cross_the_spill_boundary_intact() {
    let sim = RemoteStoreSim::new();
    let (reader, _) = reader_for(&sim);
    let node = identity::namehash("alice.eth");

    // 31 bytes stays inline, anything longer spills; exercise both and a
    // multi-word payload.
    let inline = "a".repeat(31);
    let spilled = "b".repeat(32);
    let multi_word = format!("https://{}.example/path?q=1", "c".repeat(60));

    sim.set_text(node, "inline", &inline);
    sim.set_text(node, "spilled", &spilled);
    sim.set_text(node, "multi", &multi_word);

    assert_eq!(reader.text(node, "inline").await.unwrap(), inline);
    assert_eq!(reader.text(node, "spilled").await.unwrap(), spilled);
    assert_eq!(reader.text(node, "multi").await.unwrap(), multi_word);
}

#[tokio::test]
async fn absent_records_read_as_zero_values() {
    let sim = RemoteStoreSim::new();
    let (reader, _) = reader_for(&sim);
    let node = identity::namehash("nobody.eth");

    assert_eq!(reader.addr(node).await.unwrap(), WalletId::zero());
    assert_eq!(reader.addr_coin(node, U256::from(0u64)).await.unwrap(), Vec::<u8>::new());
    assert_eq!(reader.text(node, "url").await.unwrap(), "");
    assert_eq!(reader.contenthash(node).await.unwrap(), Vec::<u8>::new());
}

#[tokio::test]
async fn version_bumps_hide_previous_records() {
    let sim = RemoteStoreSim::new();
    let (reader, _) = reader_for(&sim);
    let node = identity::namehash("alice.eth");

    sim.set_text(node, "url", "before");
    assert_eq!(reader.text(node, "url").await.unwrap(), "before");

    sim.clear_records(node);
    assert_eq!(reader.text(node, "url").await.unwrap(), "");

    // Writes after the bump land in the new version and are visible.
    sim.set_text(node, "url", "after");
    assert_eq!(reader.text(node, "url").await.unwrap(), "after");
}

#[tokio::test]
async fn verification_misses_read_as_zero_values() {
    let sim = RemoteStoreSim::new();
    let (reader, gateway) = reader_for(&sim);
    let node = identity::namehash("alice.eth");
    let wallet = test_wallet(0xaa);
    sim.set_addr(node, wallet);
    sim.set_text(node, "url", "proven");

    gateway.force_status(3);
    assert_eq!(reader.addr(node).await.unwrap(), WalletId::zero());
    assert_eq!(reader.text(node, "url").await.unwrap(), "");

    // The same plans prove again once the verifier recovers.
    gateway.clear_forced_status();
    assert_eq!(reader.addr(node).await.unwrap(), wallet);
    assert_eq!(reader.text(node, "url").await.unwrap(), "proven");
}

#[tokio::test]
async fn transport_failures_propagate_as_errors() {
    let reader = RemoteReader::new(
        Config { target: test_wallet(0x99) },
        Arc::new(UnreachableGateway),
    );
    let node = identity::namehash("alice.eth");

    // Unlike a proof miss, a failing transport surfaces to the caller.
    assert!(matches!(
        reader.addr(node).await,
        Err(Error::Transport(TransportError::Unavailable(_))),
    ));
    assert!(matches!(
        reader.text(node, "url").await,
        Err(Error::Transport(TransportError::Unavailable(_))),
    ));
}

#[tokio::test]
async fn remote_reads_agree_with_the_local_engine() {
    use hexns_resolver::{Config as ResolverConfig, Resolver};
    use hexns_test_service::MemoryDirectory;

    let directory = Arc::new(MemoryDirectory::new());
    let resolver = Resolver::new(ResolverConfig {
        directory: directory.clone(),
        wrapper: None,
    });
    let sim = RemoteStoreSim::new();
    let (reader, _) = reader_for(&sim);

    let owner = test_wallet(1);
    let node = identity::namehash("alice.eth");
    directory.register(node, owner);

    // Commit the same records to both engines.
    let wallet = test_wallet(0xaa);
    resolver.set_addr(owner, node, wallet).unwrap();
    sim.set_addr(node, wallet);
    resolver.set_text(owner, node, "url", "https://alice.example").unwrap();
    sim.set_text(node, "url", "https://alice.example");

    assert_eq!(reader.addr(node).await.unwrap(), resolver.addr(node));
    assert_eq!(reader.text(node, "url").await.unwrap(), resolver.text(node, "url"));

    // Clearing on both sides keeps them aligned.
    resolver.clear_records(owner, node).unwrap();
    sim.clear_records(node);
    assert_eq!(reader.text(node, "url").await.unwrap(), resolver.text(node, "url"));
    assert_eq!(reader.addr(node).await.unwrap(), resolver.addr(node));
}
