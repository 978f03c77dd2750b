fn main() -> anyhow::Result<()> {
    blackvision::run()
}
