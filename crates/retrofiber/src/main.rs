use anyhow::Context;
use retrofiber::{CoreType, RunInfo};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(core), Some(path)) = (args.next(), args.next()) else {
        eprintln!(
            "Usage: retrofiber <mos6502|lr35902> <program.bin> [load-address] [cycles]\n\
             For example:\n\
             retrofiber mos6502 demo.bin 0x0200 100000"
        );
        std::process::exit(1);
    };
    let core: CoreType = core.parse()?;
    let load_address = match args.next() {
        Some(text) => retrofiber::parse_address(&text)?,
        None => core.default_load_address(),
    };
    let cycles = match args.next() {
        Some(text) => text
            .parse::<u64>()
            .with_context(|| format!("invalid cycle count '{text}'"))?,
        None => 100_000,
    };

    log::info!("Running program: '{}'", path);
    let program =
        std::fs::read(&path).with_context(|| format!("failed to read program '{path}'"))?;

    let info = RunInfo::builder()
        .core(core)
        .load_address(load_address)
        .cycles(cycles)
        .build();
    let report = retrofiber::run(info, &program)?;

    println!("{:?} after {} cycles", report.exit, report.cycles);
    println!("{}", report.registers);
    if let Some(next) = report.next_instruction {
        println!("next: {next}");
    }
    Ok(())
}
