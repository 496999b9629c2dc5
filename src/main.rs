fn main() -> anyhow::Result<()> {
    cube_core::run()
}
