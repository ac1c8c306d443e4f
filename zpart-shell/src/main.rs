fn main() -> anyhow::Result<()> {
    zpart_shell::run()
}
