//! Registration of the merkle tree hash when code 601 is already taken
//!
//! Lives in its own test binary so the process-wide registry starts empty.

use merklecid_core::config::ParseLengthCommand;
use merklecid_core::registry::{self, MultihashHasher};
use merklecid_core::{
    register_merkle_tree_hash, run, Command, Config, HashError, Invocation, Result, RuntimeError,
    TracingContext, MERKLE_TREE_HASH_CODE,
};

struct ConstantHasher;

impl MultihashHasher for ConstantHasher {
    fn update(&mut self, _data: &[u8]) {}

    fn finalize(&mut self) -> Result<Vec<u8>> {
        Ok(vec![0x7f])
    }

    fn reset(&mut self) {}

    fn size(&self) -> usize {
        1
    }
}

fn new_constant() -> Box<dyn MultihashHasher> {
    Box::new(ConstantHasher)
}

#[tokio::test]
async fn test_occupied_code_is_reported() {
    assert!(registry::register(MERKLE_TREE_HASH_CODE, new_constant));

    assert!(matches!(
        register_merkle_tree_hash(),
        Err(HashError::HashTypeConflict(MERKLE_TREE_HASH_CODE))
    ));
    // Still reported on later calls, existing entry untouched
    assert!(matches!(
        register_merkle_tree_hash(),
        Err(HashError::HashTypeConflict(MERKLE_TREE_HASH_CODE))
    ));
    assert_eq!(registry::lookup(MERKLE_TREE_HASH_CODE).unwrap().size(), 1);

    let invocation = Invocation {
        config: Config::default(),
        command: Command::ParseLength(ParseLengthCommand {
            cid: "bafk5sbbdnhnyy4iwzatcfvr3yteddvjx26twcgasybb3j37vx3ishpqeqsdacaac".to_string(),
        }),
    };
    let result = run(invocation, &TracingContext::named("test")).await;

    assert!(matches!(
        result,
        Err(RuntimeError::Hash(HashError::HashTypeConflict(MERKLE_TREE_HASH_CODE)))
    ));
}
