use super::fail;

pub fn run(host: &str, port: u16) {
    let base = format!("http://{host}:{port}");

    println!("prngbench server v{}", prngbench_core::VERSION);
    println!("   {base}");
    println!();
    println!("   Endpoints:");
    println!("     GET  /                  API index (try: curl {base})");
    println!("     GET  /health            Health check");
    println!("     POST /api/v1/generate   Generate a sequence");
    println!("     POST /api/v1/tests      Run tests on supplied values");
    println!("     POST /api/v1/evaluate   Generate and test in one call");
    println!();
    println!("   Examples:");
    println!(
        "     curl -X POST {base}/api/v1/generate -H 'content-type: application/json' \\"
    );
    println!(r#"          -d '{{"method":"lcg","x0":37,"k":6,"c":7,"g":12,"count":10}}'"#);
    println!("     curl -X POST {base}/api/v1/tests -H 'content-type: application/json' \\");
    println!(r#"          -d '{{"values":[0.12,0.57,0.93,0.31],"tests":{{"means":true}}}}'"#);
    println!();

    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| fail(e));
    if let Err(e) = rt.block_on(prngbench_server::run_server(host, port)) {
        fail(format!("server stopped: {e}"));
    }
}
