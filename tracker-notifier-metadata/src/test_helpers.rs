// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Proptest support for report types.

use crate::{CodeLocation, Failure, LeafType, SpecState, TestReport};
use proptest::prelude::*;
use std::time::Duration;

impl Arbitrary for LeafType {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: ()) -> Self::Strategy {
        prop_oneof![
            4 => Just(LeafType::It),
            1 => Just(LeafType::SynchronizedBeforeSuite),
            1 => Just(LeafType::SynchronizedAfterSuite),
            1 => Just(LeafType::BeforeSuite),
            1 => Just(LeafType::AfterSuite),
            1 => Just(LeafType::ReportAfterSuite),
            1 => Just(LeafType::CleanupAfterEach),
            1 => "[A-Za-z][A-Za-z ]{0,15}".prop_map(|s| LeafType::from(s.as_str())),
        ]
        .boxed()
    }
}

impl Arbitrary for SpecState {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: ()) -> Self::Strategy {
        prop_oneof![
            Just(SpecState::Passed),
            Just(SpecState::Failed),
            Just(SpecState::Skipped),
            Just(SpecState::Pending),
            Just(SpecState::Panicked),
            Just(SpecState::TimedOut),
            Just(SpecState::Interrupted),
            Just(SpecState::Aborted),
        ]
        .boxed()
    }
}

fn label_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "name:[a-z_ ]{0,10}",
        "maintainer:[a-z]{0,8}",
        "[a-z:]{0,12}",
    ]
}

fn stack_trace_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-z./()\n\t]{0,24}",
        ("[a-z./()\n\t]{0,24}", "[0-9a-f]{1,6}").prop_map(|(head, addr)| format!("{head}+0x{addr}")),
    ]
}

impl Arbitrary for TestReport {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: ()) -> Self::Strategy {
        (
            any::<LeafType>(),
            "[a-zA-Z \"\\\\]{0,24}",
            prop::collection::vec("[a-zA-Z ]{0,12}", 0..3),
            prop::collection::vec(label_strategy(), 0..4),
            any::<SpecState>(),
            any::<bool>(),
            any::<bool>(),
            stack_trace_strategy(),
            0u64..600,
            1u32..5,
        )
            .prop_map(
                |(
                    leaf_type,
                    leaf_text,
                    container_path,
                    labels,
                    state,
                    is_serial,
                    is_in_ordered_container,
                    full_stack_trace,
                    run_secs,
                    parallel_process,
                )| TestReport {
                    leaf_type,
                    leaf_text,
                    container_path,
                    labels,
                    state,
                    run_time: Duration::from_secs(run_secs),
                    start_time: None,
                    is_serial,
                    is_in_ordered_container,
                    failure: Failure {
                        message: String::new(),
                        location: CodeLocation {
                            file_name: "suite_test.go".to_owned(),
                            line_number: 1,
                            full_stack_trace,
                            custom_message: String::new(),
                        },
                    },
                    parallel_process,
                },
            )
            .boxed()
    }
}
