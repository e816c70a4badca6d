fn main() -> anyhow::Result<()> {
    galaxy_scene::run(galaxy_scene::GalaxyConfig::default())
}
