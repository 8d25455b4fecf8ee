pub async fn shutdown_signal() {
    let _str = groundlink::signal::wait_for_stop_signal().await;
}
