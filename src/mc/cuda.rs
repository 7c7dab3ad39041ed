// src/mc/cuda.rs
//! CUDA backend for the path kernel.
//!
//! The device kernel is the same per-path algorithm as
//! [`crate::mc::kernel::discounted_payoff`], compiled by NVRTC at runtime.
//! One GPU thread owns one path index; when the grid is smaller than the
//! path count, a grid-stride loop walks each thread across
//! `idx, idx + stride, idx + 2*stride, ...` so every slot is written exactly
//! once. The stream synchronize after launch is the completion barrier
//! before results are copied back to the host.
//!
//! Accumulation is double precision end to end, matching the CPU paths.

use crate::error::{McError, McResult};
use crate::mc::kernel::SimConfig;
use cudarc::driver::{CudaContext, PushKernelArg};
use cudarc::nvrtc::compile_ptx;
use ndarray::Array2;

/// CUDA kernel source for the average-price knockout payoff.
pub const PAYOFF_KERNEL_SOURCE: &str = r#"
extern "C" __global__ void avg_barrier_payoffs(
    const double* draws,
    double* out,
    unsigned int paths,
    unsigned int steps,
    double s0,
    double mu,
    double sigma,
    double dt,
    double sqrt_dt,
    double strike,
    double barrier,
    double discount
) {
    unsigned int idx = blockIdx.x * blockDim.x + threadIdx.x;
    unsigned int stride = gridDim.x * blockDim.x;

    for (unsigned int p = idx; p < paths; p += stride) {
        const double* z = draws + (size_t)p * steps;
        double s = s0;
        double avg = 0.0;

        for (unsigned int n = 0; n < steps; ++n) {
            s += mu * dt * s + sigma * s * sqrt_dt * z[n];
            avg += (s - avg) / (double)(n + 1);
            if (avg <= barrier) break;
        }

        double payoff = avg - strike;
        out[p] = (payoff > 0.0 ? payoff : 0.0) * discount;
    }
}
"#;

fn cuda_err(e: impl ToString) -> McError {
    McError::DeviceError {
        backend: "cuda".to_string(),
        reason: e.to_string(),
    }
}

/// Run the payoff kernel on `device`, filling `out` with one discounted
/// payoff per path.
pub fn run_cuda(
    cfg: &SimConfig,
    draws: &Array2<f64>,
    out: &mut [f64],
    device: usize,
) -> McResult<()> {
    let host_draws = draws.as_slice().ok_or_else(|| cuda_err(
        "draw buffer is not contiguous in standard layout",
    ))?;

    let context = CudaContext::new(device).map_err(cuda_err)?;
    let stream = context.default_stream();

    let ptx = compile_ptx(PAYOFF_KERNEL_SOURCE).map_err(cuda_err)?;
    let module = context.load_module(ptx).map_err(cuda_err)?;
    let kernel = module.load_function("avg_barrier_payoffs").map_err(cuda_err)?;

    // SAFETY: cudarc's alloc returns properly aligned device memory. The size
    // is computed from the input data.
    let mut draws_dev = unsafe {
        stream
            .alloc::<f64>(host_draws.len())
            .map_err(cuda_err)?
    };
    stream
        .memcpy_htod(host_draws, &mut draws_dev)
        .map_err(cuda_err)?;

    // SAFETY: as above.
    let mut out_dev = unsafe { stream.alloc::<f64>(cfg.paths).map_err(cuda_err)? };

    let paths = cfg.paths as u32;
    let steps = cfg.steps as u32;
    let dt = cfg.t / cfg.steps as f64;
    let sqrt_dt = dt.sqrt();
    let discount = cfg.discount();

    let block_size = 256u32;
    // Cap the grid so large runs exercise the stride loop instead of
    // launching one thread per path.
    let grid_size = ((paths + block_size - 1) / block_size).clamp(1, 1024);

    // SAFETY: Kernel arguments match the compiled PTX signature. Device
    // pointers are valid and allocated with sufficient size.
    unsafe {
        stream
            .launch_builder(&kernel)
            .arg(&draws_dev)
            .arg(&mut out_dev)
            .arg(&paths)
            .arg(&steps)
            .arg(&cfg.s0)
            .arg(&cfg.mu)
            .arg(&cfg.sigma)
            .arg(&dt)
            .arg(&sqrt_dt)
            .arg(&cfg.strike)
            .arg(&cfg.barrier)
            .arg(&discount)
            .launch(cudarc::driver::LaunchConfig {
                grid_dim: (grid_size, 1, 1),
                block_dim: (block_size, 1, 1),
                shared_mem_bytes: 0,
            })
            .map_err(cuda_err)?;
    }

    // All units must complete before the host reads the output buffer.
    context.synchronize().map_err(cuda_err)?;

    stream.memcpy_dtoh(&out_dev, out).map_err(cuda_err)?;

    Ok(())
}

/// Check whether a CUDA device is available.
pub fn is_cuda_available() -> bool {
    std::panic::catch_unwind(|| {
        CudaContext::device_count().map(|c| c > 0).unwrap_or(false)
    })
    .unwrap_or(false)
}
