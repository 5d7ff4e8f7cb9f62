fn main() -> anyhow::Result<()> {
    fluent_english_lib::run()
}
