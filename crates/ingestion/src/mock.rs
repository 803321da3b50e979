//! Mock stream source
//!
//! Implements `MessageSource` trait, generates a simulated SENSR stream.
//! Used for testing and development without a live deployment.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use contracts::{
    BoundingBox, EventRecord, FeedCallback, FeedEvent, HealthStatus, ListeningType, LosingEvent,
    MessageSource, NodeHealth, ObjectLabel, ObjectStream, OutputMessage, PointCloud,
    PointCloudKind, PointResult, StreamError, StreamMessage, SystemHealth, TrackedObject,
    TrackingStatus, Vector3, ZoneEvent, ZoneEventKind,
};
use tracing::{debug, trace};

use crate::util::pod_slice_to_bytes;

/// Radius of the circular path objects move on (m)
const ORBIT_RADIUS: f64 = 10.0;
/// Angle advanced per message (rad)
const ANGLE_STEP: f64 = 0.05;
/// Objects count as inside their zone while sin(angle) exceeds this
const ZONE_BOUNDARY: f64 = 0.3;
/// A losing event is emitted every this many messages
const LOSING_PERIOD: u64 = 50;
/// Points attached to each tracked object
const OBJECT_POINTS: usize = 8;

const LABELS: [ObjectLabel; 4] = [
    ObjectLabel::Car,
    ObjectLabel::Pedestrian,
    ObjectLabel::Cyclist,
    ObjectLabel::Misc,
];

/// Fault injected into the stream at a scripted position
#[derive(Debug, Clone)]
pub struct ScriptedFault {
    /// Tick index (1-based) after which the fault fires
    pub after_message: u64,
    /// Fault to deliver
    pub error: StreamError,
}

/// Mock feed configuration
#[derive(Debug, Clone)]
pub struct MockFeedConfig {
    /// Send frequency (Hz)
    pub frequency_hz: f64,
    /// Categories the feed emits
    pub emit: ListeningType,
    /// Tracked objects per output message
    pub objects_per_message: usize,
    /// Points in the raw cloud of each point result
    pub points_per_cloud: usize,
    /// Zones objects cycle through
    pub zone_ids: Vec<u32>,
    /// Every Nth output message carries a health report (0 disables)
    pub health_every: u64,
    /// Scripted faults
    pub faults: Vec<ScriptedFault>,
}

impl Default for MockFeedConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 10.0,
            emit: ListeningType::all(),
            objects_per_message: 3,
            points_per_cloud: 256,
            zone_ids: vec![1, 2],
            health_every: 10,
            faults: Vec::new(),
        }
    }
}

/// Mock feed
///
/// Implements `MessageSource` trait, generates simulated messages at the
/// configured frequency in a background thread. Objects move on
/// deterministic circular paths so zone entry/exit events occur naturally.
#[derive(Debug)]
pub struct MockFeed {
    source_id: String,
    config: MockFeedConfig,
    listening: Arc<AtomicBool>,
}

impl MockFeed {
    /// Create new mock feed
    pub fn new(source_id: String, config: MockFeedConfig) -> Self {
        Self {
            source_id,
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create mock feed with default configuration
    pub fn with_defaults(source_id: String) -> Self {
        Self::new(source_id, MockFeedConfig::default())
    }
}

/// Wall-clock unix timestamp (seconds)
fn unix_now() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}

fn label_size(label: ObjectLabel) -> Vector3 {
    match label {
        ObjectLabel::Car => Vector3 {
            x: 4.5,
            y: 1.8,
            z: 1.5,
        },
        ObjectLabel::Pedestrian => Vector3 {
            x: 0.6,
            y: 0.6,
            z: 1.7,
        },
        ObjectLabel::Cyclist => Vector3 {
            x: 1.8,
            y: 0.6,
            z: 1.7,
        },
        ObjectLabel::Misc => Vector3 {
            x: 1.0,
            y: 1.0,
            z: 1.0,
        },
    }
}

/// Generate the output message for tick `n`
///
/// `zone_membership` maps object id to the zone it currently occupies;
/// diffing it against the new positions yields entry/exit events.
fn synth_output(
    config: &MockFeedConfig,
    n: u64,
    timestamp: f64,
    zone_membership: &mut HashMap<u32, u32>,
) -> OutputMessage {
    let mut objects = Vec::with_capacity(config.objects_per_message);
    let mut zone_events = Vec::new();
    let slot_spacing = std::f64::consts::TAU / config.objects_per_message.max(1) as f64;

    for slot in 0..config.objects_per_message {
        let id = slot as u32 + 1;
        let angle = n as f64 * ANGLE_STEP + slot as f64 * slot_spacing;
        let label = LABELS[slot % LABELS.len()];
        let position = Vector3 {
            x: ORBIT_RADIUS * angle.cos(),
            y: ORBIT_RADIUS * angle.sin(),
            z: 0.8,
        };
        let speed = ORBIT_RADIUS * ANGLE_STEP * config.frequency_hz;

        let in_zone = angle.sin() > ZONE_BOUNDARY;
        let zone = if config.zone_ids.is_empty() {
            None
        } else {
            Some(config.zone_ids[slot % config.zone_ids.len()])
        };

        match (zone_membership.get(&id).copied(), in_zone, zone) {
            (None, true, Some(zone_id)) => {
                zone_membership.insert(id, zone_id);
                zone_events.push(ZoneEvent {
                    kind: ZoneEventKind::Entry,
                    zone_id,
                    object_id: id,
                    timestamp,
                });
            }
            (Some(zone_id), false, _) => {
                zone_membership.remove(&id);
                zone_events.push(ZoneEvent {
                    kind: ZoneEventKind::Exit,
                    zone_id,
                    object_id: id,
                    timestamp,
                });
            }
            _ => {}
        }

        let mut cluster = Vec::with_capacity(OBJECT_POINTS * 3);
        let mut intensities = Vec::with_capacity(OBJECT_POINTS);
        for i in 0..OBJECT_POINTS {
            let offset = (i as f32 - OBJECT_POINTS as f32 / 2.0) * 0.1;
            cluster.extend_from_slice(&[
                position.x as f32 + offset,
                position.y as f32 - offset,
                position.z as f32 + (i % 4) as f32 * 0.2,
            ]);
            intensities.push(((i * 31) % 256) as f32 / 255.0);
        }

        objects.push(TrackedObject {
            id,
            label,
            tracking_status: if n <= 2 {
                TrackingStatus::Init
            } else {
                TrackingStatus::Tracking
            },
            bbox: BoundingBox {
                position,
                size: label_size(label),
            },
            velocity: Vector3 {
                x: -angle.sin() * speed,
                y: angle.cos() * speed,
                z: 0.0,
            },
            zone_ids: zone_membership.get(&id).map(|z| vec![*z]).unwrap_or_default(),
            points: pod_slice_to_bytes(&cluster),
            intensities: pod_slice_to_bytes(&intensities),
        });
    }

    let mut losing = Vec::new();
    if n % LOSING_PERIOD == 0 && config.objects_per_message > 0 {
        let object_id = ((n / LOSING_PERIOD - 1) % config.objects_per_message as u64) as u32 + 1;
        losing.push(LosingEvent {
            object_id,
            timestamp,
        });
    }

    let health = if config.health_every > 0 && n % config.health_every == 0 {
        Some(synth_health(n / config.health_every))
    } else {
        None
    };

    let event = if zone_events.is_empty() && losing.is_empty() {
        None
    } else {
        Some(EventRecord {
            zone: zone_events,
            losing,
        })
    };

    OutputMessage {
        timestamp,
        stream: Some(ObjectStream { objects, health }),
        event,
    }
}

/// Generate the health report for the given cadence cycle
fn synth_health(cycle: u64) -> SystemHealth {
    let node_status = if cycle % 3 == 0 {
        HealthStatus::Degraded
    } else {
        HealthStatus::Good
    };

    let mut sensors = BTreeMap::new();
    sensors.insert("lidar-front".to_string(), HealthStatus::Good);
    sensors.insert("lidar-rear".to_string(), node_status);

    let mut nodes = BTreeMap::new();
    nodes.insert(
        "10.0.0.2".to_string(),
        NodeHealth {
            status: node_status,
            sensors,
        },
    );

    SystemHealth {
        master: HealthStatus::Good,
        nodes,
    }
}

/// Generate the point result for tick `n`
fn synth_point_result(n: u64, timestamp: f64, points_per_cloud: usize) -> PointResult {
    let specs = [
        (0u32, PointCloudKind::Raw, points_per_cloud, 2.0f32),
        (1, PointCloudKind::Ground, points_per_cloud / 2, 6.0),
        (2, PointCloudKind::Background, points_per_cloud / 4, 12.0),
    ];

    let clouds = specs
        .iter()
        .map(|&(id, kind, count, base_radius)| {
            let mut points = Vec::with_capacity(count * 3);
            let mut intensities = Vec::with_capacity(count);
            for i in 0..count {
                let angle = n as f32 * 0.1 + i as f32 * 0.37;
                let radius = base_radius + (i % 32) as f32 * 0.05;
                points.extend_from_slice(&[
                    radius * angle.cos(),
                    radius * angle.sin(),
                    (i % 16) as f32 * 0.1,
                ]);
                intensities.push(((i * 7) % 256) as f32 / 255.0);
            }
            PointCloud {
                id,
                kind,
                points: pod_slice_to_bytes(&points),
                intensities: pod_slice_to_bytes(&intensities),
            }
        })
        .collect();

    PointResult { timestamp, clouds }
}

impl MessageSource for MockFeed {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn listen(&self, callback: FeedCallback) {
        // Idempotent: if already listening, don't start again
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let source_id = self.source_id.clone();
        let config = self.config.clone();
        let listening = self.listening.clone();

        let interval = Duration::from_secs_f64(1.0 / config.frequency_hz);

        thread::spawn(move || {
            let mut n: u64 = 0;
            let mut zone_membership: HashMap<u32, u32> = HashMap::new();

            debug!(
                source_id = %source_id,
                frequency_hz = config.frequency_hz,
                emit = ?config.emit,
                "mock feed started"
            );

            while listening.load(Ordering::Relaxed) {
                n += 1;
                let timestamp = unix_now();

                if config.emit.contains(ListeningType::OUTPUT_MESSAGE) {
                    let message = synth_output(&config, n, timestamp, &mut zone_membership);
                    callback(FeedEvent::Message(StreamMessage::Output(message)));
                }

                if config.emit.contains(ListeningType::POINT_RESULT) {
                    let result = synth_point_result(n, timestamp, config.points_per_cloud);
                    callback(FeedEvent::Message(StreamMessage::PointResult(result)));
                }

                for fault in config.faults.iter().filter(|f| f.after_message == n) {
                    callback(FeedEvent::Fault(fault.error.clone()));
                }

                trace!(source_id = %source_id, n, timestamp, "mock events sent");

                thread::sleep(interval);
            }

            debug!(source_id = %source_id, "mock feed stopped");
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
