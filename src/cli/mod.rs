use {clap::App, std::process};

#[macro_use]
mod logger;
mod cmd;
mod configuration;

pub fn run() {
    let yaml = load_yaml!("cli.yml");
    let matches = App::from_yaml(yaml).get_matches();

    catch_fatal!(
        {
            cmd::check(&matches);
        },
        {
            process::exit(1);
        }
    );
}
