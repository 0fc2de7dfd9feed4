fn main() -> anyhow::Result<()> {
    rt_config_generator::run()
}
