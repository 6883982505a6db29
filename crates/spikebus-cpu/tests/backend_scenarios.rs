//! End-to-end scenarios for the multi-threaded backend

use spikebus_core::messaging::{ImpactKind, SpikeMessage, SynapticImpact, SynapticImpactMessage};
use spikebus_core::neuron::BlifatNeuron;
use spikebus_core::population::{Population, PopulationVariant};
use spikebus_core::projection::{
    AdditiveStdpRule, DeltaSynapse, ProcessingMode, Projection, ProjectionVariant,
    StdpDeltaSynapse,
};
use spikebus_core::Uid;
use spikebus_cpu::{BackendConfig, CpuBackend};

fn integrator_neuron() -> BlifatNeuron {
    BlifatNeuron {
        potential_decay: 1.0,
        activation_threshold: 1.0,
        potential_reset_value: 0.0,
        ..Default::default()
    }
}

fn excitatory_impact(source: Uid, target: Uid, post_index: u32, value: f32) -> SynapticImpactMessage {
    SynapticImpactMessage {
        sender_uid: source,
        send_time: 0,
        postsynaptic_uid: target,
        impacts: vec![SynapticImpact {
            pre_index: 0,
            post_index,
            value,
            kind: ImpactKind::Excitatory,
        }],
    }
}

/// Single neuron with a self-loop of delay 1: one external impact produces a
/// spike train of period 2.
#[test]
fn single_neuron_self_loop_has_period_two() {
    let mut backend = CpuBackend::new(BackendConfig::default()).unwrap();

    let population = Population::new(vec![integrator_neuron()]);
    let pop_uid = population.get_uid();
    let loop_projection = Projection::new(
        pop_uid,
        pop_uid,
        vec![DeltaSynapse::excitatory(0, 0, 1.0, 1).unwrap()],
    );

    backend.load_populations(vec![PopulationVariant::Blifat(population)]);
    backend.load_projections(vec![ProjectionVariant::Delta(loop_projection)]);
    backend.init();

    // Let an external source feed impacts straight into the population.
    let source = Uid::new();
    backend
        .message_endpoint()
        .subscribe::<SynapticImpactMessage>(pop_uid, &[source]);

    let observer = backend.message_bus().create_endpoint();
    let observer_uid = Uid::new();
    observer.subscribe::<SpikeMessage>(observer_uid, &[pop_uid]);

    let injector = backend.message_bus().create_endpoint();
    injector.send_message(excitatory_impact(source, pop_uid, 0, 1.0));
    backend.message_bus().route_messages();

    backend.start();
    let mut spike_steps = Vec::new();
    for _ in 0..7 {
        backend.step();
        for message in observer.unload_messages::<SpikeMessage>(observer_uid) {
            spike_steps.push(message.send_time);
        }
    }
    backend.stop();

    assert_eq!(spike_steps, vec![0, 2, 4, 6]);
}

/// A blocking impact silences one neuron for its blocking period; its
/// neighbor is unaffected.
#[test]
fn blocking_impact_silences_one_neuron() {
    let mut backend = CpuBackend::new(BackendConfig::default()).unwrap();

    let population = Population::from_fn(2, |_| BlifatNeuron {
        total_blocking_period: 3,
        ..integrator_neuron()
    });
    let pop_uid = population.get_uid();
    backend.load_populations(vec![PopulationVariant::Blifat(population)]);
    backend.init();

    let source = Uid::new();
    backend
        .message_endpoint()
        .subscribe::<SynapticImpactMessage>(pop_uid, &[source]);

    let observer = backend.message_bus().create_endpoint();
    let observer_uid = Uid::new();
    observer.subscribe::<SpikeMessage>(observer_uid, &[pop_uid]);

    let injector = backend.message_bus().create_endpoint();

    let mut spikes_by_step: Vec<(u64, Vec<u32>)> = Vec::new();
    for step in 0..5u64 {
        let mut impacts = vec![
            SynapticImpact {
                pre_index: 0,
                post_index: 0,
                value: 10.0,
                kind: ImpactKind::Excitatory,
            },
            SynapticImpact {
                pre_index: 0,
                post_index: 1,
                value: 10.0,
                kind: ImpactKind::Excitatory,
            },
        ];
        if step == 0 {
            impacts.push(SynapticImpact {
                pre_index: 0,
                post_index: 0,
                value: 1.0,
                kind: ImpactKind::Blocking,
            });
        }
        injector.send_message(SynapticImpactMessage {
            sender_uid: source,
            send_time: step,
            postsynaptic_uid: pop_uid,
            impacts,
        });
        backend.message_bus().route_messages();
        backend.step();
        for message in observer.unload_messages::<SpikeMessage>(observer_uid) {
            spikes_by_step.push((message.send_time, message.neuron_indexes));
        }
    }

    for (step, indexes) in &spikes_by_step {
        if *step < 3 {
            assert!(
                !indexes.contains(&0),
                "neuron 0 fired at step {step} while blocked"
            );
        }
        assert!(indexes.contains(&1), "neuron 1 should fire every step");
    }
    // Once the blocking window ends the accumulated potential fires.
    assert!(spikes_by_step
        .iter()
        .any(|(step, indexes)| *step == 3 && indexes.contains(&0)));
}

/// Two projections with different delays: the target sees one impact per
/// projection, at `spike_step + delay`.
#[test]
fn delays_order_impact_delivery() {
    let mut backend = CpuBackend::new(BackendConfig::default()).unwrap();

    let fire_once = || BlifatNeuron {
        potential: 2.0,
        ..integrator_neuron()
    };
    let a = Population::new(vec![fire_once()]);
    let b = Population::new(vec![fire_once()]);
    let c = Population::new(vec![integrator_neuron()]);
    let (a_uid, b_uid, c_uid) = (a.get_uid(), b.get_uid(), c.get_uid());

    let a_to_c = Projection::new(a_uid, c_uid, vec![DeltaSynapse::excitatory(0, 0, 1.0, 1).unwrap()]);
    let b_to_c = Projection::new(b_uid, c_uid, vec![DeltaSynapse::excitatory(0, 0, 1.0, 2).unwrap()]);
    let (a_proj_uid, b_proj_uid) = (a_to_c.get_uid(), b_to_c.get_uid());

    backend.load_populations(vec![
        PopulationVariant::Blifat(a),
        PopulationVariant::Blifat(b),
        PopulationVariant::Blifat(c),
    ]);
    backend.load_projections(vec![
        ProjectionVariant::Delta(a_to_c),
        ProjectionVariant::Delta(b_to_c),
    ]);
    backend.init();

    let observer = backend.message_bus().create_endpoint();
    let observer_uid = Uid::new();
    observer.subscribe::<SynapticImpactMessage>(observer_uid, &[a_proj_uid, b_proj_uid]);

    let mut observed: Vec<(Uid, u64, usize)> = Vec::new();
    for _ in 0..4 {
        backend.step();
        for message in observer.unload_messages::<SynapticImpactMessage>(observer_uid) {
            observed.push((message.sender_uid, message.send_time, message.impacts.len()));
        }
    }

    assert_eq!(observed.len(), 2);
    assert!(observed.contains(&(a_proj_uid, 1, 1)));
    assert!(observed.contains(&(b_proj_uid, 2, 1)));
}

/// An empty input spike message drives no impacts and leaves pending queues
/// untouched.
#[test]
fn empty_spike_message_is_inert() {
    let mut backend = CpuBackend::new(BackendConfig::default()).unwrap();

    let population = Population::new(vec![integrator_neuron()]);
    let pop_uid = population.get_uid();
    let input_uid = Uid::new();
    let projection = Projection::new(
        input_uid,
        pop_uid,
        vec![DeltaSynapse::excitatory(0, 0, 1.0, 1).unwrap()],
    );

    backend.load_populations(vec![PopulationVariant::Blifat(population)]);
    backend.load_projections(vec![ProjectionVariant::Delta(projection)]);
    backend.init();

    let injector = backend.message_bus().create_endpoint();
    injector.send_message(SpikeMessage {
        sender_uid: input_uid,
        send_time: 0,
        neuron_indexes: vec![],
    });
    backend.message_bus().route_messages();

    for _ in 0..3 {
        backend.step();
    }
    assert!(backend.projections()[0].pending.is_empty());
}

/// STDP over a pre/post pair: the weight moves once both histories are full,
/// and the histories are cleared by the update.
#[test]
fn stdp_updates_weight_from_spike_history() {
    let mut backend = CpuBackend::new(BackendConfig::default()).unwrap();

    // The presynaptic neuron self-bursts every tick; the postsynaptic neuron
    // fires whenever the delivered impact arrives.
    let pre = Population::new(vec![BlifatNeuron {
        bursting_period: 1,
        reflexive_weight: 2.0,
        ..integrator_neuron()
    }]);
    let post = Population::new(vec![integrator_neuron()]);
    let (pre_uid, post_uid) = (pre.get_uid(), post.get_uid());

    let synapse = StdpDeltaSynapse::new(
        AdditiveStdpRule::new(2, 2).unwrap(),
        DeltaSynapse::excitatory(0, 0, 2.0, 1).unwrap(),
    );
    let mut projection = Projection::new(pre_uid, post_uid, vec![synapse]);
    projection.set_stdp_population(pre_uid, ProcessingMode::StdpAndSpike);
    projection.set_stdp_population(post_uid, ProcessingMode::StdpOnly);

    backend.load_populations(vec![
        PopulationVariant::Blifat(pre),
        PopulationVariant::Blifat(post),
    ]);
    backend.load_projections(vec![ProjectionVariant::StdpDelta(projection)]);
    backend.init();

    for _ in 0..8 {
        backend.step();
    }

    let wrapper = &backend.projections()[0];
    let ProjectionVariant::StdpDelta(projection) = &wrapper.projection else {
        panic!("expected STDP projection");
    };
    let synapse = &projection.synapses()[0];
    // Every kernel term is positive, so a triggered update strictly raises
    // the weight above its initial value.
    assert!(synapse.synapse.weight > 2.0);
}

/// The same network stepped on two backends produces identical spike trains.
#[test]
fn simulation_is_deterministic_across_runs() {
    fn run() -> Vec<(u64, Vec<u32>)> {
        let mut backend = CpuBackend::new(BackendConfig {
            thread_count: 4,
            neurons_per_thread: 2,
            spikes_per_thread: 1,
        })
        .unwrap();

        let population = Population::from_fn(8, |i| BlifatNeuron {
            potential: 0.3 * i as f64,
            ..integrator_neuron()
        });
        let pop_uid = population.get_uid();
        let synapses = (0..8)
            .map(|i| DeltaSynapse::excitatory(i, (i + 1) % 8, 0.6, 1 + (i as u64 % 3)).unwrap())
            .collect();
        let projection = Projection::new(pop_uid, pop_uid, synapses);

        backend.load_populations(vec![PopulationVariant::Blifat(population)]);
        backend.load_projections(vec![ProjectionVariant::Delta(projection)]);
        backend.init();

        let observer = backend.message_bus().create_endpoint();
        let observer_uid = Uid::new();
        observer.subscribe::<SpikeMessage>(observer_uid, &[pop_uid]);

        let mut spikes = Vec::new();
        for _ in 0..20 {
            backend.step();
            for message in observer.unload_messages::<SpikeMessage>(observer_uid) {
                spikes.push((message.send_time, message.neuron_indexes));
            }
        }
        spikes
    }

    assert_eq!(run(), run());
}
