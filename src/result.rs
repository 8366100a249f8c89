use crate::session::SessionState;

/// Final statistics of a ping session.
#[derive(Debug, Clone, PartialEq)]
pub struct PingStatistics {
    /// Number of probes sent.
    pub transmitted: u32,
    /// Number of sequence numbers resolved by a reply.
    pub received: u32,
    /// Number of replies that passed every check.
    pub consistent: u32,
    /// Packet loss, rounded half away from zero.
    pub loss_percent: u32,

    /// Smallest RTT (ms).
    pub min_ms: f64,
    /// Mean RTT (ms).
    pub avg_ms: f64,
    /// Largest RTT (ms).
    pub max_ms: f64,
    /// Population standard deviation of the RTTs (ms).
    pub mdev_ms: f64,
}

impl PingStatistics {
    /// Summarizes the RTT history and counters of a finished session.
    ///
    /// # Arguments
    /// * `session` - The state left by the probe loop.
    ///
    /// # Returns
    /// A `PingStatistics` whose RTT fields are all zero when no reply was consistent.
    pub fn from_session(session: &SessionState) -> Self {
        let rtts = session.rtt_history();
        let transmitted = session.package_count();
        let received = session.received_count();

        let (min_ms, max_ms) = if rtts.is_empty() {
            (0.0, 0.0)
        } else {
            rtts.iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                    (lo.min(r), hi.max(r))
                })
        };

        Self {
            transmitted,
            received,
            consistent: rtts.len() as u32,
            loss_percent: loss_percent(transmitted, received),
            min_ms,
            avg_ms: mean(rtts),
            max_ms,
            mdev_ms: population_std_dev(rtts),
        }
    }
}

/// `round(100 * (1 - received / transmitted))`, with `.5` rounded up.
pub fn loss_percent(transmitted: u32, received: u32) -> u32 {
    if transmitted == 0 {
        return 0;
    }
    let ratio = 1.0 - received as f64 / transmitted as f64;
    (100.0 * ratio).round().max(0.0) as u32
}

/// Arithmetic mean, `0.0` for an empty slice.
/// [reference](https://en.wikipedia.org/wiki/Arithmetic_mean)
pub fn mean(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }

    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Standard deviation over the whole population, dividing by `N`.
/// [reference](https://en.wikipedia.org/wiki/Standard_deviation)
pub fn population_std_dev(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }

    let m = mean(v);
    let variance = v.iter().map(|x| (x - m).powi(2)).sum::<f64>() / v.len() as f64;
    variance.sqrt()
}
