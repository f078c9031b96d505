fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile the Terraform plugin protocol (server side only)
    tonic_prost_build::configure()
        .build_client(false)
        .compile_protos(&["proto/tfplugin6.proto"], &["proto"])?;
    Ok(())
}
