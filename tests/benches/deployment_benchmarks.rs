//! # Zodiac Connext Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | Address derivation | CREATE2 mastercopy, proxy prediction |
//! | ABI | `xReceive` decoding, instruction decoding |
//! | Relay | authenticated dispatch on the in-memory chain |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use zc_deployment::domain::services::{derive_address_from_init_code, predict_proxy_address};
use zc_deployment::prelude::*;
use zc_tests::fixtures::*;

// ============================================================================
// ADDRESS DERIVATION
// ============================================================================

fn bench_address_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("address-derivation");
    let factory = SINGLETON_FACTORY;

    for size in [64usize, 1024, 24 * 1024] {
        let init_code = vec![0x60u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("create2", size), &init_code, |b, code| {
            b.iter(|| derive_address_from_init_code(black_box(factory), Hash::ZERO, black_box(code)))
        });
    }

    let setup = ProxySetupSpec::for_module(Address::ONE, &module_params(), U256::from(0xfa));
    group.bench_function("predict_proxy", |b| {
        b.iter(|| {
            predict_proxy_address(
                black_box(MODULE_PROXY_FACTORY),
                setup.mastercopy,
                setup.setup_calldata.as_slice(),
                setup.salt_nonce,
            )
        })
    });
    group.finish();
}

// ============================================================================
// ABI
// ============================================================================

fn bench_abi_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("abi");
    let message = relay_message(ORIGIN, ORIGIN_SENDER, 1000, push_counter());
    let calldata = message.encode_call();

    group.bench_function("decode_x_receive", |b| {
        b.iter(|| RelayMessage::decode_call(black_box(&calldata)))
    });
    group.bench_function("decode_instruction", |b| {
        b.iter(|| Instruction::decode(black_box(message.call_data.as_slice())))
    });
    group.finish();
}

// ============================================================================
// RELAY
// ============================================================================

fn bench_relay_dispatch(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let chain = network(31337);
    let (_, proxy) = runtime.block_on(deploy_module(&chain, 0xfa));
    wire_module(&chain, proxy, 0);

    let message = relay_message(ORIGIN, ORIGIN_SENDER, 0, push_counter());
    c.bench_function("relay/dispatch", |b| {
        b.iter(|| relay(&chain, CONNEXT, proxy, black_box(&message)))
    });
}

criterion_group!(
    benches,
    bench_address_derivation,
    bench_abi_decoding,
    bench_relay_dispatch
);
criterion_main!(benches);
