use super::super::args::*;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let global = cli.global;
    match cli.cmd {
        Command::Aggregate(args) => super::aggregate::run(&global, args),
        Command::ProcessAll(args) => super::process_all::run(&global, args),
        Command::Pack(args) => super::pack::run(args),
        Command::Unpack(args) => super::unpack::run(&global, args),
        Command::List => super::list::run(&global),
    }
}
