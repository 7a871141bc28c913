use opentelemetry::{
    global,
    metrics::{Counter, Histogram, MeterProvider},
    KeyValue,
};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::Registry;
use std::collections::HashSet;

pub struct Metrics {
    request_counter: Counter<u64>,
    frame_size: Histogram<u64>,
    store_errors: Counter<u64>,
    pub registry: Registry,
    _provider: SdkMeterProvider,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();
        let exporter = opentelemetry_prometheus::exporter()
            .with_registry(registry.clone())
            .build()?;

        let provider = SdkMeterProvider::builder().with_reader(exporter).build();

        let meter = provider.meter("frame_relay");
        global::set_meter_provider(provider.clone());

        let request_counter = meter
            .u64_counter("requests_total")
            .with_description("Total number of relay requests")
            .build();

        let boundaries = generate_boundaries((16, 64, 512, 4096, 32768))
            .into_iter()
            .map(|kib| kib * 1024.0)
            .collect::<Vec<_>>();

        let frame_size = meter
            .u64_histogram("frame_bytes")
            .with_boundaries(boundaries)
            .with_description("Size of accepted frames in bytes")
            .build();

        let store_errors = meter
            .u64_counter("store_errors_total")
            .with_description("Frame writes that failed")
            .build();

        Ok(Metrics {
            request_counter,
            frame_size,
            store_errors,
            registry,
            _provider: provider,
        })
    }

    pub fn record_request(&self, route: &str) {
        let attributes = vec![KeyValue::new("route", route.to_string())];
        self.request_counter.add(1, &attributes);
    }

    pub fn record_frame_size(&self, bytes: usize, route: &str) {
        let attributes = vec![KeyValue::new("route", route.to_string())];
        self.frame_size.record(bytes as u64, &attributes);
    }

    pub fn record_store_error(&self, route: &str) {
        let attributes = vec![KeyValue::new("route", route.to_string())];
        self.store_errors.add(1, &attributes);
    }
}

/// Bucket boundaries (in KiB) that get coarser as frames grow: steps of 16 up to the
/// first pivot, then 32, 512 and 4096.
fn generate_boundaries(parts: (i32, i32, i32, i32, i32)) -> Vec<f64> {
    let first_step: usize = 16;
    let middle_step: usize = 32;
    let end_step: usize = 512;
    let tail_step: usize = 4096;
    let first_part = (parts.0..=parts.1).step_by(first_step);
    let middle_part = (parts.1..=parts.2).step_by(middle_step);
    let end_part = (parts.2..=parts.3).step_by(end_step);
    let tail_part = (parts.3..=parts.4).step_by(tail_step);

    let mut seen = HashSet::new();
    first_part
        .chain(middle_part)
        .chain(end_part)
        .chain(tail_part)
        .filter(|&x| seen.insert(x))
        .map(|x| x as f64)
        .collect()
}
