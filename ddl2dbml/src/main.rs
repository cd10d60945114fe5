use clap::Parser;
use ddl2dbml::{Cli, CliApp, Commands, project_info, run_init, setup_logging};
use tracing::{debug, error};

fn main() {
    // 解析命令行参数
    let cli = Cli::parse();

    // 设置日志记录
    setup_logging(cli.verbose);
    debug!("{}", project_info::get_version_string());
    debug!("{}", project_info::get_copyright_info());

    // `init` 命令不需要预先加载配置
    if let Commands::Init { force } = cli.command {
        if let Err(e) = run_init(cli.config.as_deref(), force) {
            error!("❌ 初始化失败: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    let app = match CliApp::new(cli.config.as_deref(), cli.verbose) {
        Ok(app) => app,
        Err(e) => {
            error!("❌ 应用初始化失败: {:#}", e);
            if cli.config.is_none() {
                error!("👉 可以运行 'ddl2dbml init' 生成默认配置文件");
            }
            std::process::exit(1);
        }
    };

    // 运行命令
    if let Err(e) = app.run(cli.command) {
        error!("❌ 操作失败: {:#}", e);
        std::process::exit(1);
    }
}
