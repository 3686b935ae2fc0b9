fn main() -> anyhow::Result<()> {
    symmetry_vision::cli_main::main()
}
