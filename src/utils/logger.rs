use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_cli_logger(verbose: bool) {
    let directive = if verbose {
        format!("{}=debug,info", env!("CARGO_CRATE_NAME"))
    } else {
        format!("{}=info", env!("CARGO_CRATE_NAME"))
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// 函式名稱 (例如 `avg-csv`) 轉為 tracing target，再加上函式庫本身的 target
pub fn lambda_filter_directive(function_name: &str) -> String {
    format!(
        "{}=info,{}=info",
        env!("CARGO_CRATE_NAME"),
        function_name.replace('-', "_")
    )
}

pub fn init_lambda_logger(function_name: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(lambda_filter_directive(function_name)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .without_time() // Lambda 平台會自行加上時間戳
                .json(), // CloudWatch 使用 JSON 格式較易查詢
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lambda_filter_covers_function_target() {
        assert_eq!(
            lambda_filter_directive("avg-csv"),
            "stats_lambdas=info,avg_csv=info"
        );
        assert_eq!(
            lambda_filter_directive("users-stats"),
            "stats_lambdas=info,users_stats=info"
        );
        assert!(EnvFilter::try_new(lambda_filter_directive("avg-csv")).is_ok());
    }
}
