//! Distribution fixtures shared across the test modules.

use crate::distr::{ContDistr, ContDistrRef, CvecDistr, CvecDistrRef, DiscrDistr, DiscrDistrRef, Domain};

const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_8;

/// Normal law with the given mean and standard deviation, parametrized
/// through the record's parameter vector (`[mu, sigma]`).
pub(crate) fn normal(mu: f64, sigma: f64) -> ContDistrRef {
    let mut d = ContDistr::new(Domain::UNBOUNDED);
    d.set_logpdf(Box::new(|x, p| {
        let z = (x - p[0]) / p[1];
        -0.5 * z * z - p[1].ln() - LN_SQRT_2PI
    }));
    d.set_dlogpdf(Box::new(|x, p| -(x - p[0]) / (p[1] * p[1])));
    d.set_params(&[mu, sigma]).expect("finite parameters");
    d.into_ref()
}

/// Exponential law with rate `lambda` on `[0, inf)`, with closed-form CDF
/// and inverse CDF.
pub(crate) fn expo(lambda: f64) -> ContDistrRef {
    let mut d = ContDistr::new(Domain::new(0., f64::INFINITY).expect("valid domain"));
    d.set_pdf(Box::new(|x, p| {
        if x < 0. {
            0.
        } else {
            p[0] * (-p[0] * x).exp()
        }
    }));
    d.set_logpdf(Box::new(|x, p| {
        if x < 0. {
            f64::NEG_INFINITY
        } else {
            p[0].ln() - p[0] * x
        }
    }));
    d.set_dlogpdf(Box::new(|_x, p| -p[0]));
    d.set_cdf(Box::new(|x, p| {
        if x < 0. {
            0.
        } else {
            -(-p[0] * x).exp_m1()
        }
    }));
    d.set_invcdf(Box::new(|u, p| -(-u).ln_1p() / p[0]));
    d.set_params(&[lambda]).expect("finite parameters");
    d.into_ref()
}

/// Standard bivariate normal with correlation `rho` (`params[0]`),
/// unnormalized: the log-density is zero at the origin.
pub(crate) fn bivariate_normal(rho: f64) -> CvecDistrRef {
    let mut d = CvecDistr::new(2).expect("positive dimension");
    d.set_logpdf(Box::new(|x, p| {
        let r = p[0];
        let s = 1. - r * r;
        -(x[0] * x[0] - 2. * r * x[0] * x[1] + x[1] * x[1]) / (2. * s)
    }));
    d.set_dlogpdf(Box::new(|x, p, grad| {
        let r = p[0];
        let s = 1. - r * r;
        grad[0] = -(x[0] - r * x[1]) / s;
        grad[1] = -(x[1] - r * x[0]) / s;
    }));
    d.set_params(&[rho]).expect("finite parameters");
    d.into_ref()
}

/// Geometric law on `{0, ..., 200}` with success probability `p`.
pub(crate) fn geometric(p: f64) -> DiscrDistrRef {
    let mut d = DiscrDistr::new(0, 200).expect("valid domain");
    d.set_pmf(Box::new(|k, params| {
        let p = params[0];
        p * (1. - p).powi(k as i32)
    }));
    d.set_params(&[p]).expect("finite parameters");
    d.into_ref()
}

/// Poisson law with mean `lambda`, truncated far into the upper tail.
pub(crate) fn poisson(lambda: f64) -> DiscrDistrRef {
    let mut d = DiscrDistr::new(0, 400).expect("valid domain");
    d.set_pmf(Box::new(|k, params| {
        let lam = params[0];
        let mut mass = (-lam).exp();
        for i in 1..=k {
            mass *= lam / i as f64;
        }
        mass
    }));
    d.set_params(&[lambda]).expect("finite parameters");
    d.into_ref()
}
