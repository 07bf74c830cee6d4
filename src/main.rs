use std::{env, fs::File, io::BufWriter, process::exit};

use anyhow::{Context as _, Result};

use hack_vm::driver;

fn help() -> ! {
    eprintln!(
        "\
vm file name or directory is not given.

Usage: hack-vm <vm filename or directory>
"
    );
    exit(1);
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let Some(path) = args.get(1) else {
        help();
    };

    let plan = driver::plan(path).context("could not resolve given vm path")?;

    let file = File::create(&plan.output_path)
        .with_context(|| format!("could not create {}", plan.output_path.display()))?;
    let mut writer = BufWriter::new(file);

    driver::translate(&plan, &mut writer).context("translation failed")?;

    Ok(())
}
