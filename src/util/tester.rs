//! Grounded on the teacher's `EvmTester`, with the async host-apply closures
//! and `Future`-returning `check_and_get_result` dropped: nothing in this
//! crate's [`Host`] ever suspends, so the builder calls the interpreter
//! directly instead of threading an executor through the test helper.

use crate::{
    error::ErrorCode,
    host::Host,
    interpreter::{AnalyzedCode, Output},
    message::{CallKind, Message, TxContext},
    revision::Revision,
    trace::Tracer,
    util::{bytecode::Bytecode, mocked_host::MockedHost},
};
use bytes::Bytes;
use educe::Educe;
use ethereum_types::{Address, U256};
use std::sync::Arc;

fn exec(host: &mut MockedHost, revision: Revision, message: Message, code: Bytes) -> (Output, Tracer) {
    if revision >= Revision::Berlin {
        host.access_account(message.sender);
        host.access_account(message.destination);
    }
    let mut tracer = Tracer::new();
    let output = AnalyzedCode::analyze(code).execute(host, &mut tracer, message, revision);
    (output, tracer)
}

#[derive(Clone, Copy, Debug)]
enum GasCheck {
    Used(i64),
    Left(i64),
}

/// Tester that executes EVM bytecode against a [`MockedHost`] and runs a set
/// of assertions against the result.
#[derive(Clone, Educe)]
#[educe(Debug)]
#[must_use]
pub struct EvmTester {
    host: MockedHost,
    #[educe(Debug(ignore))]
    apply_host_fns: Vec<Arc<dyn Fn(&mut MockedHost, &Message) + 'static>>,
    #[educe(Debug(ignore))]
    inspect_output_fn: Arc<dyn Fn(&[u8]) + 'static>,
    #[educe(Debug(ignore))]
    inspect_host_fn: Arc<dyn Fn(&MockedHost, &Message) + 'static>,
    #[educe(Debug(ignore))]
    inspect_fn: Arc<dyn Fn(&MockedHost, &Message, &[u8]) + 'static>,
    revision: Revision,
    message: Message,
    code: Bytes,
    gas_check: Option<GasCheck>,
    expected_error_codes: Option<Vec<ErrorCode>>,
    expected_output_data: Option<Vec<u8>>,
}

impl Default for EvmTester {
    fn default() -> Self {
        Self::new()
    }
}

impl EvmTester {
    /// Create new `EvmTester`.
    pub fn new() -> Self {
        Self {
            host: MockedHost::default(),
            apply_host_fns: vec![],
            inspect_output_fn: Arc::new(|_| ()),
            inspect_host_fn: Arc::new(|_, _| ()),
            inspect_fn: Arc::new(|_, _, _| ()),
            revision: Revision::Shanghai,
            message: Message {
                kind: CallKind::Call,
                is_static: false,
                depth: 0,
                gas: i64::MAX,
                destination: Address::zero(),
                sender: Address::zero(),
                input_data: Bytes::new(),
                value: U256::zero(),
                origin: Address::zero(),
                gas_price: U256::zero(),
            },
            code: Bytes::new(),
            gas_check: None,
            expected_error_codes: None,
            expected_output_data: None,
        }
    }

    /// Set code to be executed.
    pub fn code(mut self, code: impl Into<Bytecode>) -> Self {
        self.code = code.into().build().into();
        self
    }

    /// Queue a function that mutates the host before execution.
    pub fn apply_host_fn(mut self, host_fn: impl Fn(&mut MockedHost, &Message) + 'static) -> Self {
        self.apply_host_fns.push(Arc::new(host_fn));
        self
    }

    /// Set EVM revision for this tester.
    pub fn revision(mut self, revision: Revision) -> Self {
        self.revision = revision;
        self
    }

    /// Set message depth.
    pub fn depth(mut self, depth: i32) -> Self {
        self.message.depth = depth;
        self
    }

    /// Set provided gas.
    pub fn gas(mut self, gas: i64) -> Self {
        self.message.gas = gas;
        self
    }

    /// Set static message flag.
    pub fn set_static(mut self, is_static: bool) -> Self {
        self.message.is_static = is_static;
        self
    }

    /// Set message destination.
    pub fn destination(mut self, destination: impl Into<Address>) -> Self {
        self.message.destination = destination.into();
        self
    }

    /// Set message sender.
    pub fn sender(mut self, sender: impl Into<Address>) -> Self {
        self.message.sender = sender.into();
        self
    }

    /// Set message value.
    pub fn value(mut self, value: impl Into<U256>) -> Self {
        self.message.value = value.into();
        self
    }

    /// Set message origin.
    pub fn origin(mut self, origin: impl Into<Address>) -> Self {
        self.message.origin = origin.into();
        self
    }

    /// Set message gas price.
    pub fn gas_price(mut self, gas_price: impl Into<U256>) -> Self {
        self.message.gas_price = gas_price.into();
        self
    }

    /// Set the block context read back by `COINBASE`/`NUMBER`/etc.
    pub fn tx_context(mut self, tx_context: TxContext) -> Self {
        self.host.tx_context = tx_context;
        self
    }

    /// Check how much gas will be used. Mutually exclusive with `gas_left`.
    pub fn gas_used(mut self, expected_gas_used: i64) -> Self {
        self.gas_check = Some(GasCheck::Used(expected_gas_used));
        self
    }

    /// Check how much gas will be left after execution. Mutually exclusive with `gas_used`.
    pub fn gas_left(mut self, expected_gas_left: i64) -> Self {
        self.gas_check = Some(GasCheck::Left(expected_gas_left));
        self
    }

    /// Set provided input data.
    pub fn input(mut self, input: impl Into<Bytes>) -> Self {
        self.message.input_data = input.into();
        self
    }

    /// Check the returned error code.
    pub fn status(mut self, expected_error_code: ErrorCode) -> Self {
        self.expected_error_codes = Some(vec![expected_error_code]);
        self
    }

    /// Check the returned error code to be one of these.
    pub fn status_one_of<const N: usize>(mut self, expected_error_codes: [ErrorCode; N]) -> Self {
        self.expected_error_codes = Some(expected_error_codes.to_vec());
        self
    }

    /// Check output to be equal to the big-endian encoding of an integer.
    pub fn output_value(mut self, expected_output_data: impl Into<U256>) -> Self {
        let mut data = [0; 32];
        expected_output_data.into().to_big_endian(&mut data);
        self.expected_output_data = Some(data.to_vec());
        self
    }

    /// Check output data to be equal to the provided byte string.
    pub fn output_data(mut self, expected_output_data: impl Into<Vec<u8>>) -> Self {
        self.expected_output_data = Some(expected_output_data.into());
        self
    }

    /// Inspect output with provided function.
    pub fn inspect_output(mut self, inspect_output_fn: impl Fn(&[u8]) + 'static) -> Self {
        self.inspect_output_fn = Arc::new(inspect_output_fn);
        self
    }

    /// Inspect host with provided function.
    pub fn inspect_host(mut self, f: impl Fn(&MockedHost, &Message) + 'static) -> Self {
        self.inspect_host_fn = Arc::new(f);
        self
    }

    /// Inspect host and output with provided function.
    pub fn inspect(mut self, f: impl Fn(&MockedHost, &Message, &[u8]) + 'static) -> Self {
        self.inspect_fn = Arc::new(f);
        self
    }

    /// Execute provided code, run checks, and return the interpreter's output.
    pub fn check_and_get_result(self) -> Output {
        let mut host = self.host;
        for f in &self.apply_host_fns {
            (f)(&mut host, &self.message);
        }

        let (output, _trace) = exec(&mut host, self.revision, self.message.clone(), self.code);

        if let Some(error_codes) = &self.expected_error_codes {
            assert!(
                error_codes.iter().any(|c| *c == output.error_code),
                "error code mismatch: {:?}, but must be one of {:?}",
                output.error_code,
                error_codes
            );
        }

        if let Some(gas_check) = self.gas_check {
            match gas_check {
                GasCheck::Used(used) => assert_eq!(self.message.gas - output.gas_left, used),
                GasCheck::Left(left) => assert_eq!(output.gas_left, left),
            }
        }

        if let Some(expected_data) = &self.expected_output_data {
            assert_eq!(&*output.output_data, expected_data);
        }

        (self.inspect_output_fn)(&output.output_data);
        (self.inspect_host_fn)(&host, &self.message);
        (self.inspect_fn)(&host, &self.message, &output.output_data);

        output
    }

    /// Execute provided code and run checks.
    pub fn check(self) {
        self.check_and_get_result();
    }
}
