fn main() -> anyhow::Result<()> {
    // USI talks on stdout, so diagnostics go to stderr.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();
    tsubame::init();
    let handle = std::thread::Builder::new()
        .name("usi".to_string())
        .stack_size(tsubame::stack_size::STACK_SIZE)
        .spawn(tsubame::usi::cmd_loop)?;
    match handle.join() {
        Ok(result) => result,
        Err(_) => anyhow::bail!("the usi thread panicked"),
    }
}
