use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use starknet_types_core::felt::Felt;

use crate::cheatcodes::{spec, Cheatcodes};
use crate::errors::CheatcodeError;

/// Local execution-context overrides of block state. Scoped to a single
/// script invocation; leaking an override across test cases is a bug.
#[derive(Debug, Default)]
pub struct BlockCheats {
    timestamp_overrides: HashMap<Felt, u64>,
    target_default: Option<Felt>,
}

impl BlockCheats {
    /// The active timestamp override for a contract, if any.
    pub fn timestamp(&self, contract_address: Felt) -> Option<u64> {
        self.timestamp_overrides.get(&contract_address).copied()
    }

    /// Sets the default warp target, normally the contract under test.
    pub fn set_target_default(&mut self, contract_address: Felt) {
        self.target_default = Some(contract_address);
    }

    fn install(&mut self, contract_address: Felt, timestamp: u64) -> Option<u64> {
        self.timestamp_overrides.insert(contract_address, timestamp)
    }

    fn restore(&mut self, contract_address: Felt, previous: Option<u64>) {
        match previous {
            Some(timestamp) => {
                self.timestamp_overrides.insert(contract_address, timestamp);
            }
            None => {
                self.timestamp_overrides.remove(&contract_address);
            }
        }
    }
}

/// Reversal action returned by `warp`: consuming it restores the timestamp
/// state the override replaced. Restoration is the caller's responsibility
/// and happens exactly when they choose.
#[derive(Debug)]
pub struct TimestampRevert {
    block: Rc<RefCell<BlockCheats>>,
    contract_address: Felt,
    previous: Option<u64>,
}

impl TimestampRevert {
    pub fn revert(self) {
        self.block.borrow_mut().restore(self.contract_address, self.previous);
    }
}

impl Cheatcodes {
    /// Installs a block-timestamp override for a contract. No network call;
    /// the returned action undoes the override.
    pub fn warp(
        &mut self,
        blk_timestamp: u64,
        target_contract_address: Option<Felt>,
    ) -> Result<TimestampRevert, CheatcodeError> {
        let target = target_contract_address
            .or_else(|| self.block.borrow().target_default)
            .ok_or_else(|| {
                CheatcodeError::failed(
                    spec("warp").name,
                    "No target contract address. Please either provide one or set the contract \
                     under test.",
                )
            })?;
        let previous = self.block.borrow_mut().install(target, blk_timestamp);
        Ok(TimestampRevert {
            block: Rc::clone(&self.block),
            contract_address: target,
            previous,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_is_installed_and_restored() {
        let block = Rc::new(RefCell::new(BlockCheats::default()));
        let target = Felt::from(0x99u64);

        let previous = block.borrow_mut().install(target, 1000);
        assert_eq!(previous, None);
        assert_eq!(block.borrow().timestamp(target), Some(1000));

        let revert = TimestampRevert { block: Rc::clone(&block), contract_address: target, previous };
        revert.revert();
        assert_eq!(block.borrow().timestamp(target), None);
    }

    #[test]
    fn nested_overrides_restore_the_prior_value() {
        let block = Rc::new(RefCell::new(BlockCheats::default()));
        let target = Felt::from(0x99u64);

        let outer = block.borrow_mut().install(target, 500);
        let inner = block.borrow_mut().install(target, 1000);
        assert_eq!(inner, Some(500));
        assert_eq!(block.borrow().timestamp(target), Some(1000));

        TimestampRevert { block: Rc::clone(&block), contract_address: target, previous: inner }
            .revert();
        assert_eq!(block.borrow().timestamp(target), Some(500));

        TimestampRevert { block: Rc::clone(&block), contract_address: target, previous: outer }
            .revert();
        assert_eq!(block.borrow().timestamp(target), None);
    }
}
