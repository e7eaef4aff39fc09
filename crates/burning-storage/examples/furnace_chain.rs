//! Feeds a chain of furnaces from an endless coal supply.
//!
//! Set `BURNING_FUEL_TABLE` to a JSON fuel table and `BURNING_DURATION_SCALE_PERCENT`
//! to scale it. Use `RUST_LOG=burning_storage=trace` to watch every transaction.

use burning_storage::{
    transfer, transfer_outer, FuelTableConfig, InfiniteStorage, Quantity, ResourceKind,
    SimpleStorage, Storage, StorageListener, StorageSnapshot, TransactionManager,
};
use std::rc::Rc;

struct Lamp(&'static str);

impl StorageListener for Lamp {
    fn on_commit(&self, state: &StorageSnapshot) {
        let status = if state.is_burning() { "lit" } else { "out" };
        println!("{}: {} ({}/{} ticks of {})", self.0, status, state.current, state.max, state.zero.kind());
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let lookup = FuelTableConfig::from_env()?.load()?;
    let lookup = lookup.as_ref();
    let manager = TransactionManager::new();

    let supply = InfiniteStorage::new(ResourceKind::coal());
    let hopper = SimpleStorage::new(ResourceKind::coal());
    let furnaces = [
        SimpleStorage::new(ResourceKind::coal()),
        SimpleStorage::new(ResourceKind::coal()),
    ];
    for (furnace, name) in furnaces.iter().zip(["left", "right"]) {
        furnace.add_listener(Rc::new(Lamp(name)));
    }

    let coal = Quantity::one_of(ResourceKind::coal());
    let loaded = transfer_outer(Some(&supply), Some(&hopper), &coal, lookup, &manager);
    println!("hopper loaded with {}", loaded);

    // Both furnaces are fed in one transaction, so both commit or neither does.
    let tx = manager.open_outer();
    let half = coal.with_value(i64::from(coal.ticks(lookup) / 2), lookup);
    for furnace in &furnaces {
        let moved = transfer(Some(&hopper), Some(furnace), &half, lookup, &tx);
        println!("moved {}", moved);
    }
    tx.commit();

    println!(
        "hopper holds {}, supply reports {}",
        hopper.current_quantity(lookup),
        supply.current_quantity(lookup)
    );
    Ok(())
}
