use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    // 编译 custody.proto（server 端只在测试桩中使用）
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .type_attribute(".", "#[derive(serde::Serialize)]")
        .out_dir(&out_dir)
        .compile_protos(&["../proto/lab/system/custody/custody.proto"], &["../proto"])?;

    println!("cargo:rerun-if-changed=../proto/lab/system/custody/custody.proto");

    Ok(())
}
