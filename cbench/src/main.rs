fn main() -> anyhow::Result<()> {
    cbench::run()
}
