//! Multi-threaded step scheduler
//!
//! One tick runs population phases A/B/C with per-phase barriers, routes the
//! emitted spikes, runs the projections serially (each internally chunked
//! over workers), and routes the resulting impacts. Work inside a phase is
//! data-parallel over disjoint neuron or spike ranges; the only contended
//! resources are the bus queue and the endpoint tables, both mutex-guarded
//! inside the core bus.

use ahash::AHashMap;
use rayon::prelude::*;

use spikebus_core::messaging::{SpikeMessage, SynapticImpactMessage};
use spikebus_core::population::PopulationVariant;
use spikebus_core::projection::ProjectionVariant;
use spikebus_core::{CoreError, MessageBus, MessageEndpoint, TagMap, Uid};

use crate::device::CpuDevice;
use crate::error::{CpuError, Result};
use crate::kernel::{blifat, delta, stdp};

/// Tuning knobs for the backend's worker pool and work partitioning.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Worker thread count; 0 selects one thread per available core.
    pub thread_count: usize,
    /// Neurons handed to one worker per population phase task.
    pub neurons_per_thread: usize,
    /// Spikes handed to one worker per projection task.
    pub spikes_per_thread: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            thread_count: 0,
            neurons_per_thread: 1024,
            spikes_per_thread: 64,
        }
    }
}

impl BackendConfig {
    /// Validate the partitioning constants.
    pub fn validate(&self) -> Result<()> {
        if self.neurons_per_thread == 0 {
            return Err(CoreError::invalid_parameter("neurons_per_thread", "0", ">= 1").into());
        }
        if self.spikes_per_thread == 0 {
            return Err(CoreError::invalid_parameter("spikes_per_thread", "0", ">= 1").into());
        }
        Ok(())
    }
}

/// A loaded projection together with its pending-impact queue.
///
/// The queue maps a future step number to the impact message that will be
/// sent when the scheduler reaches that step. Delays are at least one step,
/// so entries are always for strictly future steps and drain in step order.
#[derive(Debug)]
pub struct ProjectionWrapper {
    /// The wrapped projection.
    pub projection: ProjectionVariant,
    /// Pending impact messages keyed by delivery step.
    pub pending: AHashMap<u64, SynapticImpactMessage>,
}

impl ProjectionWrapper {
    fn new(projection: ProjectionVariant) -> Self {
        Self {
            projection,
            pending: AHashMap::new(),
        }
    }
}

/// The multi-threaded CPU backend: populations, projections, bus and the
/// step scheduler over a fixed worker pool.
///
/// Dropping the backend tears down the pool, joining all workers.
pub struct CpuBackend {
    uid: Uid,
    tags: TagMap,
    populations: Vec<PopulationVariant>,
    projections: Vec<ProjectionWrapper>,
    message_bus: MessageBus,
    endpoint: MessageEndpoint,
    pool: rayon::ThreadPool,
    config: BackendConfig,
    step: u64,
    started: bool,
}

impl CpuBackend {
    /// Create a backend with its own bus, endpoint and worker pool.
    pub fn new(config: BackendConfig) -> Result<Self> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.thread_count)
            .build()
            .map_err(|e| CpuError::thread_pool(e.to_string()))?;
        let message_bus = MessageBus::new();
        let endpoint = message_bus.create_endpoint();
        log::info!(
            "CPU backend created, {} worker threads",
            pool.current_num_threads()
        );
        Ok(Self {
            uid: Uid::new(),
            tags: TagMap::new(),
            populations: Vec::new(),
            projections: Vec::new(),
            message_bus,
            endpoint,
            pool,
            config,
            step: 0,
            started: false,
        })
    }

    /// UID of this backend instance.
    pub fn get_uid(&self) -> Uid {
        self.uid
    }

    /// Tags attached to this backend.
    pub fn get_tags(&self) -> &TagMap {
        &self.tags
    }

    /// Mutable tags attached to this backend.
    pub fn get_tags_mut(&mut self) -> &mut TagMap {
        &mut self.tags
    }

    /// The bus this backend routes over. External input and observer
    /// endpoints are created from it.
    pub fn message_bus(&self) -> &MessageBus {
        &self.message_bus
    }

    /// The backend's own endpoint. Exposed so callers can wire additional
    /// senders into a population's impact subscription.
    pub fn message_endpoint(&self) -> &MessageEndpoint {
        &self.endpoint
    }

    /// Replace the loaded populations.
    pub fn load_populations(&mut self, populations: Vec<PopulationVariant>) {
        log::debug!("loading {} populations", populations.len());
        self.populations = populations;
    }

    /// Replace the loaded projections, wrapping each with an empty pending
    /// queue.
    pub fn load_projections(&mut self, projections: Vec<ProjectionVariant>) {
        log::debug!("loading {} projections", projections.len());
        self.projections = projections.into_iter().map(ProjectionWrapper::new).collect();
    }

    /// Remove the populations with the given UIDs.
    pub fn remove_populations(&mut self, uids: &[Uid]) {
        self.populations.retain(|p| !uids.contains(&p.uid()));
    }

    /// Remove the projections with the given UIDs, dropping their pending
    /// impacts.
    pub fn remove_projections(&mut self, uids: &[Uid]) {
        self.projections
            .retain(|w| !uids.contains(&w.projection.uid()));
    }

    /// Loaded populations, in load order.
    pub fn populations(&self) -> &[PopulationVariant] {
        &self.populations
    }

    /// Loaded projections with their pending queues, in load order.
    pub fn projections(&self) -> &[ProjectionWrapper] {
        &self.projections
    }

    /// Subscribe every projection to its presynaptic population's spikes
    /// (plus its STDP senders) and every postsynaptic population to its
    /// projections' impacts.
    pub fn init(&mut self) {
        log::debug!("initializing subscriptions");
        for wrapper in &self.projections {
            let projection = &wrapper.projection;
            let this_uid = projection.uid();

            let mut spike_senders = vec![projection.presynaptic_uid()];
            for sender in projection.stdp_sender_uids() {
                if !spike_senders.contains(&sender) {
                    spike_senders.push(sender);
                }
            }
            spike_senders.retain(|uid| !uid.is_nil());
            if !spike_senders.is_empty() {
                self.endpoint.subscribe::<SpikeMessage>(this_uid, &spike_senders);
            }

            let post_uid = projection.postsynaptic_uid();
            if !post_uid.is_nil() {
                self.endpoint
                    .subscribe::<SynapticImpactMessage>(post_uid, &[this_uid]);
            }
        }
    }

    /// Mark the backend as running. The caller drives `step()` until its own
    /// stop condition.
    pub fn start(&mut self) {
        self.started = true;
        log::info!("backend {} started", self.uid);
    }

    /// Mark the backend as stopped.
    pub fn stop(&mut self) {
        self.started = false;
        log::info!("backend {} stopped", self.uid);
    }

    /// Whether the backend is between `start()` and `stop()`.
    pub fn running(&self) -> bool {
        self.started
    }

    /// The current step number; increments once per `step()`.
    pub fn current_step(&self) -> u64 {
        self.step
    }

    /// Names of the neuron types this backend computes.
    pub fn get_supported_neurons(&self) -> Vec<&'static str> {
        vec!["BLIFATNeuron"]
    }

    /// Names of the synapse types this backend computes.
    pub fn get_supported_synapses(&self) -> Vec<&'static str> {
        vec!["DeltaSynapse", "AdditiveSTDPDeltaSynapse"]
    }

    /// Devices this backend runs on.
    pub fn get_current_devices(&self) -> Vec<CpuDevice> {
        vec![CpuDevice::new("CPU", self.pool.current_num_threads())]
    }

    /// Execute one simulation tick.
    pub fn step(&mut self) {
        log::debug!("starting step #{}", self.step);
        self.calculate_populations();
        self.message_bus.route_messages();
        self.endpoint.receive_all_messages();
        self.calculate_projections();
        self.message_bus.route_messages();
        self.endpoint.receive_all_messages();
        self.step += 1;
        log::debug!("step finished");
    }

    /// Population phases A, B and C with a barrier between each.
    fn calculate_populations(&mut self) {
        let neurons_per_thread = self.config.neurons_per_thread;
        let step = self.step;
        let pool = &self.pool;
        let populations = &mut self.populations;
        let endpoint = &self.endpoint;

        // Phase A: pre-input integration, chunked over workers.
        pool.install(|| {
            populations.par_iter_mut().for_each(|population| match population {
                PopulationVariant::Blifat(p) => p
                    .neurons_mut()
                    .par_chunks_mut(neurons_per_thread)
                    .for_each(blifat::integrate_pre_input),
            });
        });

        // Phase B: apply routed impacts, one worker per population.
        let inboxes: Vec<Vec<SynapticImpactMessage>> = populations
            .iter()
            .map(|p| endpoint.unload_messages::<SynapticImpactMessage>(p.uid()))
            .collect();
        pool.install(|| {
            populations
                .par_iter_mut()
                .zip(inboxes.into_par_iter())
                .for_each(|(population, messages)| match population {
                    PopulationVariant::Blifat(p) => blifat::apply_impacts(p, &messages, step),
                });
        });

        // Phase C: spike decision, chunked over workers; chunk results are
        // concatenated in chunk order so spike lists are deterministic.
        let spike_lists: Vec<Vec<u32>> = pool.install(|| {
            populations
                .par_iter_mut()
                .map(|population| match population {
                    PopulationVariant::Blifat(p) => {
                        let chunks: Vec<Vec<u32>> = p
                            .neurons_mut()
                            .par_chunks_mut(neurons_per_thread)
                            .enumerate()
                            .map(|(chunk_index, chunk)| {
                                blifat::fire_and_reset(
                                    chunk,
                                    (chunk_index * neurons_per_thread) as u32,
                                    step,
                                )
                            })
                            .collect();
                        chunks.concat()
                    }
                })
                .collect()
        });

        for (population, spikes) in populations.iter().zip(spike_lists) {
            if spikes.is_empty() {
                continue;
            }
            log::trace!("population {} fired {} neurons", population.uid(), spikes.len());
            endpoint.send_message(SpikeMessage {
                sender_uid: population.uid(),
                send_time: step,
                neuron_indexes: spikes,
            });
        }
    }

    /// Projection processing, serialized across projections; the spike list
    /// of each projection is chunked over workers.
    fn calculate_projections(&mut self) {
        let spikes_per_thread = self.config.spikes_per_thread;
        let step = self.step;
        let pool = &self.pool;
        let endpoint = &self.endpoint;

        for wrapper in &mut self.projections {
            let uid = wrapper.projection.uid();
            let mut messages = endpoint.unload_messages::<SpikeMessage>(uid);

            let queued = match &mut wrapper.projection {
                ProjectionVariant::Delta(p) => {
                    let spikes = delta::merge_spike_indexes(&messages);
                    pool.install(|| delta::project_spikes(p, &spikes, step, spikes_per_thread))
                }
                ProjectionVariant::StdpDelta(p) => {
                    stdp::register_spikes(p, &mut messages);
                    stdp::update_weights(p);
                    let spikes = delta::merge_spike_indexes(&messages);
                    pool.install(|| delta::project_spikes(p, &spikes, step, spikes_per_thread))
                }
            };

            delta::queue_impacts(
                &mut wrapper.pending,
                wrapper.projection.uid(),
                wrapper.projection.postsynaptic_uid(),
                queued,
            );
        }

        // Deliver every impact message whose step has arrived.
        for wrapper in &mut self.projections {
            if let Some(message) = wrapper.pending.remove(&step) {
                endpoint.send_message(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spikebus_core::neuron::BlifatNeuron;
    use spikebus_core::population::Population;
    use spikebus_core::projection::{DeltaSynapse, Projection};

    fn single_population() -> (PopulationVariant, Uid) {
        let population = Population::from_fn(1, |_| BlifatNeuron {
            potential_decay: 1.0,
            ..Default::default()
        });
        let uid = population.get_uid();
        (PopulationVariant::Blifat(population), uid)
    }

    #[test]
    fn test_config_validation() {
        assert!(BackendConfig::default().validate().is_ok());
        let config = BackendConfig {
            neurons_per_thread: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_start_stop() {
        let mut backend = CpuBackend::new(BackendConfig::default()).unwrap();
        assert!(!backend.running());
        backend.start();
        assert!(backend.running());
        backend.stop();
        assert!(!backend.running());
    }

    #[test]
    fn test_step_counter_is_monotone() {
        let mut backend = CpuBackend::new(BackendConfig::default()).unwrap();
        for expected in 0..3 {
            assert_eq!(backend.current_step(), expected);
            backend.step();
        }
    }

    #[test]
    fn test_init_wires_subscriptions() {
        let mut backend = CpuBackend::new(BackendConfig::default()).unwrap();
        let (population, pop_uid) = single_population();
        let projection: Projection<DeltaSynapse> = Projection::new(
            pop_uid,
            pop_uid,
            vec![DeltaSynapse::excitatory(0, 0, 1.0, 1).unwrap()],
        );
        let proj_uid = projection.get_uid();

        backend.load_populations(vec![population]);
        backend.load_projections(vec![ProjectionVariant::Delta(projection)]);
        backend.init();

        let endpoint = backend.message_endpoint();
        assert_eq!(endpoint.sender_count::<SpikeMessage>(proj_uid), 1);
        assert_eq!(endpoint.sender_count::<SynapticImpactMessage>(pop_uid), 1);
    }

    #[test]
    fn test_load_is_destructive() {
        let mut backend = CpuBackend::new(BackendConfig::default()).unwrap();
        backend.load_populations(vec![single_population().0]);
        backend.load_populations(vec![single_population().0, single_population().0]);
        assert_eq!(backend.populations().len(), 2);
    }

    #[test]
    fn test_remove_entities() {
        let mut backend = CpuBackend::new(BackendConfig::default()).unwrap();
        let (population, pop_uid) = single_population();
        let projection: Projection<DeltaSynapse> = Projection::new(pop_uid, pop_uid, vec![]);
        let proj_uid = projection.get_uid();

        backend.load_populations(vec![population]);
        backend.load_projections(vec![ProjectionVariant::Delta(projection)]);

        backend.remove_populations(&[pop_uid]);
        backend.remove_projections(&[proj_uid]);
        assert!(backend.populations().is_empty());
        assert!(backend.projections().is_empty());
    }

    #[test]
    fn test_supported_types() {
        let backend = CpuBackend::new(BackendConfig::default()).unwrap();
        assert_eq!(backend.get_supported_neurons(), vec!["BLIFATNeuron"]);
        assert_eq!(
            backend.get_supported_synapses(),
            vec!["DeltaSynapse", "AdditiveSTDPDeltaSynapse"]
        );
        let devices = backend.get_current_devices();
        assert_eq!(devices.len(), 1);
        assert!(devices[0].worker_count() >= 1);
    }
}
