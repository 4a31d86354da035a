//! Scripted backend shared by the integration tests
//!
//! Wraps the software backend, records every dispatched lane array and
//! counts live key states. A script can fail the scratch size query or
//! replace the status of a batched call.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use num_bigint::BigUint;
use rsa_mb_core::{
    BatchStatus, KeyConfig, LaneIo, MultiBufferBackend, PrivateKey, PrivateKeyVariant, PublicKey,
    Request, Stage, Status, LANES,
};
use rsa_mb_soft::{SoftPrivateKeyState, SoftPublicKeyState, SoftwareBackend};

/// What the backend does on its next dispatch
#[derive(Debug, Clone)]
pub enum Step {
    /// Compute normally
    Pass,
    /// Fail the scratch size query with this status
    FailSizeQuery(Status),
    /// Compute, then report these statuses instead
    Report(BatchStatus),
}

/// One batched call as the backend saw it
#[derive(Debug, Clone)]
pub struct Call {
    pub stage: Stage,
    pub inputs: [Option<BigUint>; LANES],
    pub status: BatchStatus,
}

impl Call {
    pub fn live(&self) -> usize {
        self.inputs.iter().filter(|input| input.is_some()).count()
    }

    pub fn contains(&self, value: &BigUint) -> bool {
        self.inputs.iter().flatten().any(|input| input == value)
    }
}

/// Key state that reports its own release
#[derive(Debug)]
pub struct Tracked<S> {
    inner: S,
    live: Rc<Cell<usize>>,
}

impl<S> Drop for Tracked<S> {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

#[derive(Default)]
pub struct ScriptedBackend {
    inner: SoftwareBackend,
    script: RefCell<VecDeque<Step>>,
    pending: RefCell<Option<Step>>,
    calls: RefCell<Vec<Call>>,
    size_queries: Cell<usize>,
    live_states: Rc<Cell<usize>>,
    created_states: Cell<usize>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(steps: impl IntoIterator<Item = Step>) -> Self {
        let backend = Self::new();
        backend.script.borrow_mut().extend(steps);
        backend
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn calls_for(&self, stage: Stage) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.stage == stage)
            .collect()
    }

    pub fn size_queries(&self) -> usize {
        self.size_queries.get()
    }

    /// Key states materialized and not yet released
    pub fn live_key_states(&self) -> usize {
        self.live_states.get()
    }

    pub fn created_key_states(&self) -> usize {
        self.created_states.get()
    }

    fn track<S>(&self, inner: S) -> Tracked<S> {
        self.live_states.set(self.live_states.get() + 1);
        self.created_states.set(self.created_states.get() + 1);
        Tracked {
            inner,
            live: Rc::clone(&self.live_states),
        }
    }

    fn size_query(&self, computed: Result<usize, Status>) -> Result<usize, Status> {
        self.size_queries.set(self.size_queries.get() + 1);
        let step = self.script.borrow_mut().pop_front().unwrap_or(Step::Pass);
        match step {
            Step::FailSizeQuery(status) => Err(status),
            step => {
                *self.pending.borrow_mut() = Some(step);
                computed
            }
        }
    }

    fn finish(
        &self,
        stage: Stage,
        inputs: [Option<BigUint>; LANES],
        computed: BatchStatus,
    ) -> BatchStatus {
        let status = match self.pending.borrow_mut().take() {
            Some(Step::Report(status)) => status,
            _ => computed,
        };
        self.calls.borrow_mut().push(Call {
            stage,
            inputs,
            status,
        });
        status
    }
}

fn inputs(lanes: &[Option<LaneIo<'_>>; LANES]) -> [Option<BigUint>; LANES] {
    lanes.each_ref().map(|io| io.as_ref().map(|io| io.input.value().clone()))
}

impl MultiBufferBackend for ScriptedBackend {
    type PublicKeyState = Tracked<SoftPublicKeyState>;
    type PrivateKeyState = Tracked<SoftPrivateKeyState>;

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn public_key_state_size(&self, bits_n: u32, bits_e: u32) -> Result<usize, Status> {
        self.inner.public_key_state_size(bits_n, bits_e)
    }

    fn init_public_key_state(
        &self,
        bits_n: u32,
        bits_e: u32,
        size: usize,
    ) -> Result<Self::PublicKeyState, Status> {
        let state = self.inner.init_public_key_state(bits_n, bits_e, size)?;
        Ok(self.track(state))
    }

    fn set_public_key(
        &self,
        key: &PublicKey,
        state: &mut Self::PublicKeyState,
    ) -> Result<(), Status> {
        self.inner.set_public_key(key, &mut state.inner)
    }

    fn private_key_state_size(
        &self,
        variant: PrivateKeyVariant,
        bits_n: u32,
        bits_d: u32,
    ) -> Result<usize, Status> {
        self.inner.private_key_state_size(variant, bits_n, bits_d)
    }

    fn init_private_key_state(
        &self,
        variant: PrivateKeyVariant,
        bits_n: u32,
        bits_d: u32,
        size: usize,
    ) -> Result<Self::PrivateKeyState, Status> {
        let state = self.inner.init_private_key_state(variant, bits_n, bits_d, size)?;
        Ok(self.track(state))
    }

    fn set_private_key(
        &self,
        key: &PrivateKey,
        state: &mut Self::PrivateKeyState,
    ) -> Result<(), Status> {
        self.inner.set_private_key(key, &mut state.inner)
    }

    fn private_key_variant(&self, state: &Self::PrivateKeyState) -> PrivateKeyVariant {
        self.inner.private_key_variant(&state.inner)
    }

    fn public_buffer_size(
        &self,
        keys: &[Option<&Self::PublicKeyState>; LANES],
    ) -> Result<usize, Status> {
        let inner = keys.map(|key| key.map(|state| &state.inner));
        self.size_query(self.inner.public_buffer_size(&inner))
    }

    fn private_buffer_size(
        &self,
        keys: &[Option<&Self::PrivateKeyState>; LANES],
    ) -> Result<usize, Status> {
        let inner = keys.map(|key| key.map(|state| &state.inner));
        self.size_query(self.inner.private_buffer_size(&inner))
    }

    fn encrypt(
        &self,
        lanes: &mut [Option<LaneIo<'_>>; LANES],
        keys: &[Option<&Self::PublicKeyState>; LANES],
        scratch: &mut [u8],
    ) -> BatchStatus {
        let inputs = inputs(lanes);
        let inner = keys.map(|key| key.map(|state| &state.inner));
        let computed = self.inner.encrypt(lanes, &inner, scratch);
        self.finish(Stage::Encrypt, inputs, computed)
    }

    fn decrypt(
        &self,
        lanes: &mut [Option<LaneIo<'_>>; LANES],
        keys: &[Option<&Self::PrivateKeyState>; LANES],
        scratch: &mut [u8],
    ) -> BatchStatus {
        let inputs = inputs(lanes);
        let inner = keys.map(|key| key.map(|state| &state.inner));
        let computed = self.inner.decrypt(lanes, &inner, scratch);
        self.finish(Stage::Decrypt, inputs, computed)
    }
}

/// Round-trip requests with distinct plaintexts, ids starting at `first_id`
pub fn round_trips(
    key: &KeyConfig,
    variant: PrivateKeyVariant,
    first_id: u64,
    count: usize,
) -> Vec<Request> {
    let public_key = key.public_key().unwrap();
    let private_key = key.private_key(variant).unwrap();
    (first_id..first_id + count as u64)
        .map(|id| {
            Request::new(
                id,
                plaintext_for(id),
                public_key.clone(),
                private_key.clone(),
            )
            .unwrap()
        })
        .collect()
}

/// Plaintext used for request `id`; small enough for every fixture key
pub fn plaintext_for(id: u64) -> BigUint {
    BigUint::from(0x00c0_ffee_u64 + id)
}

/// Statuses of a clean batch with `live` real lanes
pub fn clean_statuses(live: usize) -> BatchStatus {
    let mut lanes = [Status::NullOperand; LANES];
    for lane in &mut lanes[..live] {
        *lane = Status::NoError;
    }
    BatchStatus::from_lanes(lanes)
}
