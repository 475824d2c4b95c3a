use std::net::SocketAddr;

use survey_server::config::{establish_connection, AppConfig};
use survey_server::state::AppState;
use survey_server::utils::logging::init_logging;
use survey_server::app;

#[tokio::main]
async fn main() {
    // 1. 환경변수 로드
    dotenvy::dotenv().ok();

    // 2. 로깅 초기화 (guard는 프로세스 종료까지 유지)
    let _guard = init_logging();

    // 3. 설정 로드
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("설정 로드 실패: {}", e);
            std::process::exit(1);
        }
    };

    // 4. DB 연결
    let db = match establish_connection(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("DB 연결 실패: {}", e);
            std::process::exit(1);
        }
    };

    // 5. 라우터 설정
    let port = config.server_port;
    let state = AppState { db, config };
    let app = survey_server::app(state);

    // 6. 서버 실행
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
