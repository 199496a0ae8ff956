//! A small potion shop wired together with a message bus.
//!
//! This example shows:
//! - Receivers handling several message types
//! - Receivers subscribing and unsubscribing themselves
//! - Strict vs lenient error policies
//! - A failing receiver stopping a dispatch
//! - Capturing the bus's log output through `ChannelLogger`

use std::{cell::Cell, rc::Rc};

use log::LevelFilter;
use potion::{logging, prelude::*};

// ============================================================================
// Messages
// ============================================================================

#[derive(Message, Debug, Clone)]
struct PotionBrewed {
    name: &'static str,
    doses: u32,
}

#[derive(Message, Debug, Clone)]
struct PotionSold {
    name: &'static str,
    price: u32,
}

#[derive(Message, Debug, Clone)]
struct ShopClosed;

// ============================================================================
// Receivers
// ============================================================================

#[derive(Default)]
struct Shelf {
    doses: Cell<u32>,
}

impl Receiver<PotionBrewed> for Shelf {
    fn handle(&self, message: &PotionBrewed) -> HandlerResult {
        self.doses.set(self.doses.get() + message.doses);
        println!("  shelf: +{} {} ({} doses)", message.doses, message.name, self.doses.get());
        Ok(())
    }
}

impl Receiver<PotionSold> for Shelf {
    fn handle(&self, message: &PotionSold) -> HandlerResult {
        let Some(left) = self.doses.get().checked_sub(1) else {
            return Err(format!("no {} left on the shelf", message.name).into());
        };
        self.doses.set(left);
        println!("  shelf: -1 {} ({left} doses)", message.name);
        Ok(())
    }
}

#[derive(Default)]
struct Till {
    takings: Cell<u32>,
}

impl Receiver<PotionSold> for Till {
    fn handle(&self, message: &PotionSold) -> HandlerResult {
        self.takings.set(self.takings.get() + message.price);
        println!("  till: +{} gold ({} total)", message.price, self.takings.get());
        Ok(())
    }
}

fn main() -> Result<(), BusError> {
    let log_records = logging::install(LevelFilter::Trace).ok();

    let shelf = Rc::new(Shelf::default());
    let till = Rc::new(Till::default());

    let mut bus = Bus::new();
    shelf.subscribe_to::<PotionBrewed>(&mut bus);
    shelf.subscribe_to::<PotionSold>(&mut bus);
    till.subscribe_to::<PotionSold>(&mut bus);

    println!("brewing");
    bus.dispatch(PotionBrewed {
        name: "healing draught",
        doses: 2,
    })?;

    println!("selling");
    for _ in 0..2 {
        bus.dispatch(PotionSold {
            name: "healing draught",
            price: 15,
        })?;
    }

    println!("selling from an empty shelf");
    match bus.dispatch(PotionSold {
        name: "healing draught",
        price: 15,
    }) {
        Err(BusError::ReceiverFailed { skipped, source, .. }) => {
            println!("  sale failed: {source} ({skipped} receiver(s) not notified)")
        }
        other => println!("  unexpected outcome: {other:?}"),
    }

    println!("closing (strict bus)");
    if let Err(error) = bus.dispatch(ShopClosed) {
        println!("  {error}");
    }

    println!("closing (lenient bus)");
    let quiet = Bus::with_config(Config::lenient());
    println!("  delivered to {} receiver(s)", quiet.dispatch(ShopClosed)?);

    shelf.unsubscribe_from::<PotionBrewed>(&mut bus)?;
    shelf.unsubscribe_from::<PotionSold>(&mut bus)?;
    till.unsubscribe_from::<PotionSold>(&mut bus)?;
    println!("bus empty: {}", bus.is_empty());

    if let Some(records) = log_records {
        println!("captured log:");
        for record in records.try_iter() {
            println!("  [{}] {}", record.level, record.message);
        }
    }

    Ok(())
}
