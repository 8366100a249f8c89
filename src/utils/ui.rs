use crate::result::PingStatistics;

pub const DELAY_SUFFIX: &str = " (Packet delay)";

pub fn success_line(byte_len: usize, host: &str, port: u16, seq: u32, rtt: f64) -> String {
    format!(
        "{} bytes from {}:{}: udp_seq={} time={:.3}",
        byte_len,
        host,
        port,
        seq as u64 + 1,
        rtt
    )
}

pub fn error_line(host: &str, port: u16, seq: u32, label: &str, rtt: f64) -> String {
    format!(
        "From {}:{}: udp_seq={} {} time={:.3}",
        host,
        port,
        seq as u64 + 1,
        label,
        rtt
    )
}

pub fn timeout_line(host: &str, port: u16, seq: u32) -> String {
    format!(
        "From {}:{}: udp_seq={} Connection time out",
        host,
        port,
        seq as u64 + 1
    )
}

pub fn unreachable_line(host: &str, port: u16, seq: u32) -> String {
    format!(
        "From {}:{}: udp_seq={} Destination Host Unreachable",
        host,
        port,
        seq as u64 + 1
    )
}

pub fn final_report(host: &str, stats: &PingStatistics) -> String {
    format!(
        "\n--- {} ping statistics ---\n\
         {} packets transmitted, {} received, {:.2}% packet loss, {} consistent packet\n\
         rtt min/avg/max/mdev = {:.2} / {:.2} / {:.2} / {:.2} ms\n",
        host,
        stats.transmitted,
        stats.received,
        stats.loss_percent as f64,
        stats.consistent,
        stats.min_ms,
        stats.avg_ms,
        stats.max_ms,
        stats.mdev_ms
    )
}

pub fn print_line(line: &str) {
    println!("{line}");
}

pub fn print_report(host: &str, stats: &PingStatistics) {
    println!("{}", final_report(host, stats));
}
