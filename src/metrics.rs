use prometheus::Encoder;

lazy_static! {

    pub static ref REQUEST_SECS: prometheus::HistogramVec = register_histogram_vec!(
        "postview_request_secs",
        "Seconds taken for each request to the posts service, partitioned by endpoint name",
        &["endpoint_name"],
        vec![0.1, 0.5, 1.0, 4.0, 16.0] // Prometheus buckets
    )
    .expect("couldn't make REQUEST_SECS");

    pub static ref RESPONSES: prometheus::IntCounterVec = register_int_counter_vec!(
        "postview_responses",
        "How many responses of Ok/Err per endpoint",
        &["endpoint_name", "result"]
    )
    .expect("couldn't make RESPONSES");

    pub static ref STALE_RESPONSES: prometheus::IntCounter = register_int_counter!(
        "postview_stale_responses",
        "Listing responses dropped because a newer request had been issued"
    )
    .expect("couldn't make STALE_RESPONSES");
}

/// Everything registered so far, in the Prometheus text format.
pub fn render() -> anyhow::Result<String> {
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = vec![];
    let metric_families = prometheus::gather();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
