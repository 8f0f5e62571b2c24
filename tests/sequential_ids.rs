//! Property: successful creations get ids 0, 1, 2, ... regardless of how
//! many rejected attempts are interleaved.

use demand_registry::positions::{NewPosition, PositionRegistry};
use proptest::prelude::*;
use solana_sdk::pubkey::Pubkey;

fn position(n: u32, org: Pubkey) -> NewPosition {
    NewPosition {
        position_number: format!("{:06}", n),
        position_name: format!("billet-{}", n),
        low_rank: n,
        high_rank: n + 2,
        trade: 56,
        environment: 1,
        task_list: 0,
        current_soldier: 0,
        owning_organization: org,
        status: 0,
        component: 2,
    }
}

proptest! {
    #[test]
    fn ids_follow_successful_creations(attempts in prop::collection::vec(any::<bool>(), 0..40)) {
        let owner = Pubkey::new_unique();
        let admin = Pubkey::new_unique();
        let outsider = Pubkey::new_unique();
        let registry = PositionRegistry::new("CAFChain", "CAF", owner);
        registry.assign_administrator_role(&owner, &[admin]).unwrap();

        let mut expected = 0u64;
        for (n, authorized) in attempts.iter().enumerate() {
            let caller = if *authorized { admin } else { outsider };
            let res = registry.create_position(&caller, position(n as u32, owner));

            if *authorized {
                prop_assert_eq!(res.unwrap(), expected);
                let stored = registry.get_position_details(expected).unwrap();
                prop_assert_eq!(stored.position_name, format!("billet-{}", n));
                expected += 1;
            } else {
                prop_assert!(res.is_err());
            }
        }

        prop_assert_eq!(registry.position_count() as u64, expected);
    }
}
