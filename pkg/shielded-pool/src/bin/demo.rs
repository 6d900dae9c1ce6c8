use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{bail, ensure, Result};
use rand::thread_rng;
use shielded_pool::{
    config::Config, logging, proof::MockProofSystem, storage::Persistent, DepositRequest, Element,
    Ledger, Note, Receipt, SharedLedger, SpendRequest, SpendWitness, SpendingKey, Store,
    WitnessOutput, BTC_ASSET_ID, TREE_DEPTH,
};

/// Replay a deposit, two transfers and a withdrawal against a shielded pool
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// A TOML config file
    #[arg(long, env = "SHIELDED_POOL_CONFIG")]
    config: Option<PathBuf>,

    /// Persist the ledger at this path, overriding the config
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// The amount Alice deposits
    #[arg(long, default_value_t = 69)]
    amount: u64,

    /// The amount Charlie withdraws, keeping the rest as change
    #[arg(long, default_value_t = 24)]
    withdraw: u64,
}

type Pool<S> = SharedLedger<TREE_DEPTH, S, MockProofSystem>;

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(db_path) = &args.db_path {
        config.db_path = Some(db_path.clone());
    }

    logging::init(&config.log)?;

    let verifier = MockProofSystem::new(Element::secure_random(thread_rng()));

    match &config.db_path {
        Some(path) => {
            let store = Persistent::<TREE_DEPTH>::open(path, config.empty_leaf())?;
            run(&SharedLedger::new(store, verifier), &args)
        }
        None => {
            let store = Ledger::<TREE_DEPTH>::new(config.empty_leaf());
            run(&SharedLedger::new(store, verifier), &args)
        }
    }
}

fn run<S: Store<TREE_DEPTH>>(pool: &Pool<S>, args: &Args) -> Result<()> {
    ensure!(
        args.withdraw <= args.amount,
        "cannot withdraw {} from a deposit of {}",
        args.withdraw,
        args.amount
    );

    let mut rng = thread_rng();
    let amount = Element::new(args.amount);

    let alice = SpendingKey::random(&mut rng);
    let bob = SpendingKey::random(&mut rng);
    let charlie = SpendingKey::random(&mut rng);
    let recipient = Element::secure_random(&mut rng);

    println!("initial root: {}", pool.root());

    let alice_note = Note::new(alice.owner(), amount, BTC_ASSET_ID, &mut rng)?;
    let receipt = pool.deposit(DepositRequest::for_note(alice_note))?;
    report("alice deposits", &receipt, pool);

    let bob_note = Note::new(bob.owner(), amount, BTC_ASSET_ID, &mut rng)?;
    let request = spend(
        pool,
        alice,
        alice_note,
        receipt.leaves.start,
        vec![WitnessOutput::shielded(bob_note)],
    )?;
    let receipt = pool.transfer(&request)?;
    report("alice pays bob", &receipt, pool);

    let charlie_note = Note::new(charlie.owner(), amount, BTC_ASSET_ID, &mut rng)?;
    let request = spend(
        pool,
        bob,
        bob_note,
        receipt.leaves.start,
        vec![WitnessOutput::shielded(charlie_note)],
    )?;
    let receipt = pool.transfer(&request)?;
    report("bob pays charlie", &receipt, pool);

    let payout = Note::payout(Element::new(args.withdraw), BTC_ASSET_ID, &mut rng)?;
    let change = Note::new(
        charlie.owner(),
        Element::new(args.amount - args.withdraw),
        BTC_ASSET_ID,
        &mut rng,
    )?;
    let request = spend(
        pool,
        charlie,
        charlie_note,
        receipt.leaves.start,
        vec![WitnessOutput::payout(payout), WitnessOutput::shielded(change)],
    )?;
    let receipt = pool.withdraw(&request, Some(recipient))?;
    report("charlie withdraws", &receipt, pool);

    match pool.withdraw(&request, Some(recipient)) {
        Ok(_) => bail!("a spent note was accepted twice"),
        Err(error) => println!("replayed withdrawal rejected: {error}"),
    }

    Ok(())
}

fn spend<S: Store<TREE_DEPTH>>(
    pool: &Pool<S>,
    key: SpendingKey,
    note: Note,
    leaf_index: u64,
    outputs: Vec<WitnessOutput>,
) -> Result<SpendRequest> {
    let path = pool.path_for(leaf_index)?;
    let witness = SpendWitness::new(key, note, leaf_index, path, outputs)?;
    let proof = pool.verifier().prove(&witness);

    Ok(SpendRequest::from_witness(&witness, proof))
}

fn report<S: Store<TREE_DEPTH>>(step: &str, receipt: &Receipt, pool: &Pool<S>) {
    println!("{step}:");
    println!("  leaves:  {:?}", receipt.leaves);
    println!("  root:    {}", receipt.root);
    println!("  balance: {}", pool.balance(BTC_ASSET_ID));

    if let Some(payout) = &receipt.payout {
        println!("  payout:  {} to {}", payout.amount, payout.recipient);
    }
}
