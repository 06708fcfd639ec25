//! `inspect`: load a mesh file through the cache and print a summary.

mod args;
mod summary;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use composer_mesh_cache::{
    CacheSettings, FileChangeMonitor, ManualMonitor, MeshCache, MeshDescriptor, NotifyMonitor,
    load_settings,
};

use args::Args;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    composer_core::init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            log::error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn absolute_path(path: &Path) -> Result<PathBuf, String> {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .map_err(|e| format!("cannot resolve {}: {e}", path.display()))
}

fn run(args: &Args) -> Result<(), String> {
    let settings = match &args.config {
        Some(config) => load_settings(config)?,
        None => CacheSettings::default(),
    };
    let path = absolute_path(&args.file)?;

    let monitor: Box<dyn FileChangeMonitor> = if args.watch {
        Box::new(NotifyMonitor::new().map_err(|e| format!("cannot start file watcher: {e}"))?)
    } else {
        Box::new(ManualMonitor::new())
    };
    let mut cache = MeshCache::new(monitor, settings);

    let descriptor = if args.bake {
        MeshDescriptor::new(&path).baked()
    } else {
        MeshDescriptor::new(&path).with_submesh(args.submesh)
    };

    let listener_descriptor = descriptor.clone();
    cache.register_fn(&path, move |cache, path| {
        log::info!("{} changed, reloading", path.display());
        print_summary(cache, &listener_descriptor);
    });

    print_summary(&mut cache, &descriptor);
    if let Some(error) = cache.error(&path)
        && !args.watch
    {
        return Err(error);
    }

    if args.watch {
        log::info!("Watching {} (Ctrl+C to stop)", path.display());
        loop {
            cache.process_file_changes();
            std::thread::sleep(POLL_INTERVAL);
        }
    }
    Ok(())
}

fn print_summary(cache: &mut MeshCache, descriptor: &MeshDescriptor) {
    let path = &descriptor.abs_path;
    let count = cache.total_mesh_count(path);
    println!("{} ({count} mesh(es))", path.display());

    if let Some(mesh) = cache.load_mesh(descriptor) {
        print!("{}", summary::describe_mesh(&mesh));
    }
    if let Some(graph) = cache.scenegraph(path) {
        print!("{}", summary::describe_scenegraph(graph));
    }
    if let Some(error) = cache.error(path) {
        println!("error: {error}");
    }
}
