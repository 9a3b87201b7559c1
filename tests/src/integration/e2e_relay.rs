//! # End-to-End Relay Flow
//!
//! 1. Mastercopy deployed through the singleton factory (placeholder args, salt zero)
//! 2. Proxy deployed and set up atomically (origin 1337, salt nonce `0xfa`)
//! 3. Proxy enabled on the avatar and funded with tokens
//! 4. Connext relays a counter push: tokens reach the avatar, counter increments once
//! 5. Messages failing authentication or execution revert with no effect

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use zc_deployment::domain::abi::{IConnextModule, SolCall};
    use zc_deployment::domain::entities::ReceiptStatus;
    use zc_deployment::domain::services::{event_topic, selector};
    use zc_deployment::prelude::*;

    const SALT_NONCE: u64 = 0xfa;
    const AMOUNT: u64 = 1000;
    const FUNDING: u64 = 5000;

    fn assert_reverted_with(receipt: &zc_deployment::domain::Receipt, needle: &str) {
        assert_eq!(receipt.status, ReceiptStatus::Reverted);
        let reason = receipt.revert_reason.as_deref().unwrap_or_default();
        assert!(reason.contains(needle), "revert reason {reason:?} lacks {needle:?}");
    }

    // =========================================================================
    // HAPPY PATH
    // =========================================================================

    #[tokio::test]
    async fn test_deploy_and_relay_end_to_end() {
        let chain = network(31337);
        let (mastercopy, proxy) = deploy_module(&chain, SALT_NONCE).await;

        let spec = ProxySetupSpec::for_module(mastercopy, &module_params(), U256::from(SALT_NONCE));
        assert_eq!(proxy, proxy_factory(&chain).predict_proxy_address(&spec));
        assert_eq!(chain.module_state(proxy), Some(ModuleState::Active(module_params())));

        wire_module(&chain, proxy, FUNDING);

        let receipt = relay(
            &chain,
            CONNEXT,
            proxy,
            &relay_message(ORIGIN, ORIGIN_SENDER, AMOUNT, push_counter()),
        );
        assert!(receipt.is_success(), "relay reverted: {:?}", receipt.revert_reason);
        assert_eq!(chain.token_balance(TOKEN, AVATAR), U256::from(AMOUNT));
        assert_eq!(chain.token_balance(TOKEN, proxy), U256::from(FUNDING - AMOUNT));
        assert_eq!(chain.counter_pushes(COUNTER), 1);
        assert_eq!(chain.counter_last_pusher(COUNTER), Some(AVATAR));
        assert_eq!(receipt.logs_with_topic(event_topic("ButtonPushed(address)")).count(), 1);

        // deploying the same proxy again changes nothing
        let again = proxy_factory(&chain).deploy_proxy(&spec).await.unwrap();
        assert!(again.noop);
        assert_eq!(again.address, proxy);

        // wrong origin: reverts, no transfer, no call
        let rejected = relay(
            &chain,
            CONNEXT,
            proxy,
            &relay_message(0xdead, ORIGIN_SENDER, AMOUNT, push_counter()),
        );
        assert_reverted_with(&rejected, "origin only");
        assert_eq!(chain.token_balance(TOKEN, AVATAR), U256::from(AMOUNT));
        assert_eq!(chain.counter_pushes(COUNTER), 1);
    }

    #[tokio::test]
    async fn test_zero_amount_only_executes() {
        let chain = network(31337);
        let (_, proxy) = deploy_module(&chain, SALT_NONCE).await;
        wire_module(&chain, proxy, FUNDING);

        let receipt = relay(
            &chain,
            CONNEXT,
            proxy,
            &relay_message(ORIGIN, ORIGIN_SENDER, 0, push_counter()),
        );
        assert!(receipt.is_success());
        assert_eq!(chain.token_balance(TOKEN, AVATAR), U256::zero());
        assert_eq!(chain.counter_pushes(COUNTER), 1);
    }

    // =========================================================================
    // AUTHENTICATION
    // =========================================================================

    #[tokio::test]
    async fn test_unauthenticated_messages_revert() {
        let chain = network(31337);
        let (_, proxy) = deploy_module(&chain, SALT_NONCE).await;
        wire_module(&chain, proxy, FUNDING);
        let stranger = Address::new([0x66; 20]);

        let cases = [
            (stranger, ORIGIN, ORIGIN_SENDER, "relayer only"),
            (CONNEXT, 0xdead, ORIGIN_SENDER, "origin only"),
            (CONNEXT, ORIGIN, stranger, "origin sender only"),
            // caller is checked before origin and sender
            (stranger, 0xdead, stranger, "relayer only"),
            (CONNEXT, 0xdead, stranger, "origin only"),
        ];
        for (relayer, origin, sender, expected) in cases {
            let receipt = relay(
                &chain,
                relayer,
                proxy,
                &relay_message(origin, sender, AMOUNT, push_counter()),
            );
            assert_reverted_with(&receipt, expected);
        }

        assert_eq!(chain.token_balance(TOKEN, proxy), U256::from(FUNDING));
        assert_eq!(chain.counter_pushes(COUNTER), 0);
    }

    #[tokio::test]
    async fn test_mastercopy_rejects_relay() {
        let chain = network(31337);
        let (mastercopy, _) = deploy_module(&chain, SALT_NONCE).await;

        // the mastercopy trusts only the placeholder connext `0x..01`
        let receipt = relay(
            &chain,
            CONNEXT,
            mastercopy,
            &relay_message(ORIGIN, ORIGIN_SENDER, 0, push_counter()),
        );
        assert_reverted_with(&receipt, "relayer only");
    }

    // =========================================================================
    // ATOMICITY
    // =========================================================================

    #[tokio::test]
    async fn test_failed_execution_undoes_transfer() {
        let chain = network(31337);
        let (_, proxy) = deploy_module(&chain, SALT_NONCE).await;
        wire_module(&chain, proxy, FUNDING);

        // the token rejects an unknown selector, so the avatar reports failure
        let failing = Bytes::from_vec(
            Instruction::call(TOKEN, Bytes::from_vec(selector("mint()").to_vec())).encode(),
        );
        let receipt = relay(
            &chain,
            CONNEXT,
            proxy,
            &relay_message(ORIGIN, ORIGIN_SENDER, AMOUNT, failing),
        );
        assert_reverted_with(&receipt, "Module transaction failed");
        assert_eq!(chain.token_balance(TOKEN, AVATAR), U256::zero());
        assert_eq!(chain.token_balance(TOKEN, proxy), U256::from(FUNDING));
    }

    #[tokio::test]
    async fn test_asset_without_code_reverts() {
        let chain = network(31337);
        let (_, proxy) = deploy_module(&chain, SALT_NONCE).await;
        wire_module(&chain, proxy, FUNDING);

        let mut message = relay_message(ORIGIN, ORIGIN_SENDER, AMOUNT, push_counter());
        message.asset = Address::new([0x42; 20]);
        let receipt = relay(&chain, CONNEXT, proxy, &message);

        assert_reverted_with(&receipt, "has no code");
        assert_eq!(chain.token_balance(TOKEN, proxy), U256::from(FUNDING));
        assert_eq!(chain.counter_pushes(COUNTER), 0);
    }

    #[tokio::test]
    async fn test_asset_returning_false_reverts() {
        let chain = network(31337);
        let (_, proxy) = deploy_module(&chain, SALT_NONCE).await;
        wire_module(&chain, proxy, FUNDING);
        assert!(chain.freeze_token(TOKEN));

        let receipt = relay(
            &chain,
            CONNEXT,
            proxy,
            &relay_message(ORIGIN, ORIGIN_SENDER, AMOUNT, push_counter()),
        );

        assert_reverted_with(&receipt, "returned false");
        assert_eq!(chain.token_balance(TOKEN, AVATAR), U256::zero());
        assert_eq!(chain.token_balance(TOKEN, proxy), U256::from(FUNDING));
        assert_eq!(chain.counter_pushes(COUNTER), 0);
    }

    #[tokio::test]
    async fn test_module_not_enabled_on_avatar() {
        let chain = network(31337);
        let (_, proxy) = deploy_module(&chain, SALT_NONCE).await;

        let receipt = relay(
            &chain,
            CONNEXT,
            proxy,
            &relay_message(ORIGIN, ORIGIN_SENDER, 0, push_counter()),
        );
        assert_reverted_with(&receipt, "Not authorized");
        assert_eq!(chain.counter_pushes(COUNTER), 0);
    }

    #[tokio::test]
    async fn test_insufficient_funds_revert() {
        let chain = network(31337);
        let (_, proxy) = deploy_module(&chain, SALT_NONCE).await;
        wire_module(&chain, proxy, 10);

        let receipt = relay(
            &chain,
            CONNEXT,
            proxy,
            &relay_message(ORIGIN, ORIGIN_SENDER, AMOUNT, push_counter()),
        );
        assert_reverted_with(&receipt, "exceeds balance");
        assert_eq!(chain.counter_pushes(COUNTER), 0);
    }

    #[tokio::test]
    async fn test_malformed_call_data() {
        let chain = network(31337);
        let (_, proxy) = deploy_module(&chain, SALT_NONCE).await;
        wire_module(&chain, proxy, FUNDING);

        let receipt = relay(
            &chain,
            CONNEXT,
            proxy,
            &relay_message(ORIGIN, ORIGIN_SENDER, AMOUNT, Bytes::from_slice(&[0xab; 5])),
        );
        assert_reverted_with(&receipt, "malformed instruction");
        assert_eq!(chain.token_balance(TOKEN, AVATAR), U256::zero());
    }

    // =========================================================================
    // OWNER CONFIGURATION
    // =========================================================================

    #[tokio::test]
    async fn test_owner_reconfigures_origin() {
        let chain = network(31337);
        let (_, proxy) = deploy_module(&chain, SALT_NONCE).await;
        wire_module(&chain, proxy, FUNDING);
        let set_origin = IConnextModule::setOriginCall { origin: 0xdead }.abi_encode();

        let denied = send(&chain, CONNEXT, proxy, set_origin.clone());
        assert_reverted_with(&denied, "owner only");

        let applied = send(&chain, DEPLOYER, proxy, set_origin);
        assert!(applied.is_success());
        assert_eq!(applied.logs_with_topic(event_topic("OriginSet(uint32)")).count(), 1);

        let old_origin = relay(
            &chain,
            CONNEXT,
            proxy,
            &relay_message(ORIGIN, ORIGIN_SENDER, 0, push_counter()),
        );
        assert_reverted_with(&old_origin, "origin only");

        let new_origin = relay(
            &chain,
            CONNEXT,
            proxy,
            &relay_message(0xdead, ORIGIN_SENDER, 0, push_counter()),
        );
        assert!(new_origin.is_success());
        assert_eq!(chain.counter_pushes(COUNTER), 1);
    }

    #[tokio::test]
    async fn test_ownership_transfer_moves_setters() {
        let chain = network(31337);
        let (_, proxy) = deploy_module(&chain, SALT_NONCE).await;
        let new_owner = Address::new([0x0e; 20]);

        let transfer = IConnextModule::transferOwnershipCall {
            newOwner: new_owner.into(),
        }
        .abi_encode();
        assert!(send(&chain, DEPLOYER, proxy, transfer).is_success());

        let set_connext = IConnextModule::setConnextCall {
            connext: new_owner.into(),
        }
        .abi_encode();
        assert_reverted_with(&send(&chain, DEPLOYER, proxy, set_connext.clone()), "owner only");
        assert!(send(&chain, new_owner, proxy, set_connext).is_success());

        match chain.module_state(proxy) {
            Some(ModuleState::Active(params)) => {
                assert_eq!(params.owner, new_owner);
                assert_eq!(params.connext, new_owner);
            }
            other => panic!("unexpected module state: {other:?}"),
        }
    }
}
