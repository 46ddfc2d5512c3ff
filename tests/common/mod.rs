#![allow(dead_code)]

use oeigen::recurrence::{ComponentRef, Factor, RecurrenceEngine};
use oeigen::table;
use oeigen::types::{Axis, CartesianComponent, Center, Shell, ShellPair};
use oeigen::{GeneratedSources, Generator, GeneratorConfig};
use std::collections::{BTreeMap, HashMap};

pub fn pair(bra: Shell, ket: Shell) -> ShellPair {
    ShellPair::new(bra, ket)
}

/// Runs a full generation for an inline TOML configuration.
pub fn generate(toml_str: &str) -> GeneratedSources {
    let config = GeneratorConfig::load_from_str(toml_str).expect("Config should parse");
    Generator::new(&config)
        .generate()
        .expect("Generation should succeed")
}

/// Two primitive Gaussians and an operator centre, reduced to the quantities the recurrence reads.
pub struct Geometry {
    pub pa: [f64; 3],
    pub pb: [f64; 3],
    pub pc: [f64; 3],
    pub zeta: f64,
    pub t: f64,
}

impl Geometry {
    pub fn new(alpha: f64, a: [f64; 3], beta: f64, b: [f64; 3], c: [f64; 3]) -> Self {
        let zeta = alpha + beta;
        let p: Vec<f64> = (0..3).map(|k| (alpha * a[k] + beta * b[k]) / zeta).collect();
        let pa = [p[0] - a[0], p[1] - a[1], p[2] - a[2]];
        let pb = [p[0] - b[0], p[1] - b[1], p[2] - b[2]];
        let pc = [p[0] - c[0], p[1] - c[1], p[2] - c[2]];
        let t = zeta * pc.iter().map(|x| x * x).sum::<f64>();
        Self {
            pa,
            pb,
            pc,
            zeta,
            t,
        }
    }

    /// An asymmetric arrangement so no component vanishes by symmetry.
    pub fn skewed() -> Self {
        Self::new(
            1.3,
            [0.1, -0.4, 0.7],
            0.8,
            [-0.9, 0.3, 0.2],
            [0.35, 0.6, -0.45],
        )
    }

    pub fn displacement(&self, center: Center, axis: Axis) -> f64 {
        let v = match center {
            Center::A => self.pa,
            Center::B => self.pb,
            Center::C => self.pc,
        };
        v[axis.index()]
    }

    /// The base auxiliary value at order `m`, standing in for `VY(0, 0, m)`.
    pub fn base(&self, m: u32) -> f64 {
        boys(m, self.t)
    }
}

/// Boys function `F_m(t)` by its downward-free series, accurate for moderate `t`.
pub fn boys(m: u32, t: f64) -> f64 {
    let mut term = 1.0 / (2.0 * m as f64 + 1.0);
    let mut sum = term;
    for k in 1..200 {
        term *= 2.0 * t / (2.0 * m as f64 + 2.0 * k as f64 + 1.0);
        sum += term;
        if term < 1e-18 * sum {
            break;
        }
    }
    (-t).exp() * sum
}

/// Evaluates components by following the engine's decompositions.
pub struct EngineEvaluator<'g> {
    engine: RecurrenceEngine,
    geometry: &'g Geometry,
    memo: HashMap<(ComponentRef, u32), f64>,
}

impl<'g> EngineEvaluator<'g> {
    pub fn new(engine: RecurrenceEngine, geometry: &'g Geometry) -> Self {
        Self {
            engine,
            geometry,
            memo: HashMap::new(),
        }
    }

    pub fn value(&mut self, component: ComponentRef, m: u32) -> f64 {
        if component.is_base() {
            return self.geometry.base(m);
        }
        if let Some(&hit) = self.memo.get(&(component, m)) {
            return hit;
        }
        let decomposition = self
            .engine
            .decompose_component(component.pair, component.bra, component.ket, m)
            .expect("Decomposition should succeed");
        let mut total = 0.0;
        for term in &decomposition.terms {
            let current = self.value(term.dependency, m);
            let next = self.value(term.dependency, m + 1);
            total += match term.factor {
                Factor::Displacement { center, axis } => {
                    self.geometry.displacement(center, axis) * current
                        - self.geometry.displacement(Center::C, axis) * next
                }
                Factor::InverseTwoZeta { multiplier } => {
                    multiplier as f64 / (2.0 * self.geometry.zeta) * (current - next)
                }
            };
        }
        self.memo.insert((component, m), total);
        total
    }
}

/// Textbook vertical recurrence taking a different route: bra first, along the last
/// nonzero axis.
pub fn reference_value(geometry: &Geometry, a: [u8; 3], b: [u8; 3], m: u32) -> f64 {
    let lower = |v: [u8; 3], k: usize| {
        let mut w = v;
        w[k] -= 1;
        w
    };
    let inv = 1.0 / (2.0 * geometry.zeta);

    if let Some(k) = (0..3).rev().find(|&k| a[k] > 0) {
        let a1 = lower(a, k);
        let mut value = geometry.pa[k] * reference_value(geometry, a1, b, m)
            - geometry.pc[k] * reference_value(geometry, a1, b, m + 1);
        if a1[k] > 0 {
            let a2 = lower(a1, k);
            value += a1[k] as f64
                * inv
                * (reference_value(geometry, a2, b, m) - reference_value(geometry, a2, b, m + 1));
        }
        if b[k] > 0 {
            let b1 = lower(b, k);
            value += b[k] as f64
                * inv
                * (reference_value(geometry, a1, b1, m) - reference_value(geometry, a1, b1, m + 1));
        }
        return value;
    }
    if let Some(k) = (0..3).rev().find(|&k| b[k] > 0) {
        let b1 = lower(b, k);
        let mut value = geometry.pb[k] * reference_value(geometry, a, b1, m)
            - geometry.pc[k] * reference_value(geometry, a, b1, m + 1);
        if b1[k] > 0 {
            let b2 = lower(b1, k);
            value += b1[k] as f64
                * inv
                * (reference_value(geometry, a, b2, m) - reference_value(geometry, a, b2, m + 1));
        }
        return value;
    }
    geometry.base(m)
}

pub fn exponents(component: CartesianComponent) -> [u8; 3] {
    [component.x, component.y, component.z]
}

/// Compares engine and reference values over every component of `pairs` at orders `0..=max_m`.
///
/// Returns the largest relative deviation seen.
pub fn run_route_check(
    group_name: &str,
    engine: RecurrenceEngine,
    geometry: &Geometry,
    pairs: &[ShellPair],
    max_m: u32,
) -> f64 {
    let mut evaluator = EngineEvaluator::new(engine, geometry);
    let mut max_error: f64 = 0.0;
    let mut checked = 0;

    println!("\nRunning Route Check: {}", group_name);
    println!("{:-<60}", "");
    for &pair in pairs {
        let mut pair_error: f64 = 0.0;
        for bra in 0..pair.bra.component_count() {
            for ket in 0..pair.ket.component_count() {
                let a = exponents(table::triple_of(pair.bra.degree(), bra).unwrap());
                let b = exponents(table::triple_of(pair.ket.degree(), ket).unwrap());
                for m in 0..=max_m {
                    let expected = reference_value(geometry, a, b, m);
                    let actual = evaluator.value(ComponentRef::new(pair, bra, ket), m);
                    let error = (actual - expected).abs() / expected.abs().max(1e-3);
                    pair_error = pair_error.max(error);
                    checked += 1;
                }
            }
        }
        println!("{:<8} | max rel. error {:.3e}", pair.to_string(), pair_error);
        max_error = max_error.max(pair_error);
    }
    println!("{:-<60}", "");
    println!("  Values Checked: {}", checked);
    println!("  Max Rel. Error: {:.3e}", max_error);
    max_error
}

/// Statement right-hand sides per written component, with every read spelled `R(bra,ket,m)`.
///
/// Works on the body of one generated constructor regardless of its storage strategy.
pub fn normalized_assignments(definitions: &str, class: &str) -> BTreeMap<(usize, usize), Vec<String>> {
    let head = format!("{}::{}(", class, class);
    let start = definitions
        .find(&head)
        .unwrap_or_else(|| panic!("definition of {} should exist", class));
    let body = &definitions[start..];
    let end = body.find("\n}\n").expect("definition should be closed");
    let body = &body[..end];

    let mut assignments: BTreeMap<(usize, usize), Vec<String>> = BTreeMap::new();
    let mut pending: Vec<String> = Vec::new();
    for line in body.lines().skip(1) {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("val = ") {
            pending = vec![normalize(rest.trim_end_matches(';'))];
        } else if let Some(rest) = line.strip_prefix("val += ") {
            pending.push(normalize(rest.trim_end_matches(';')));
        } else if line.starts_with("LOCSTOREFULL(") && line.ends_with("= val;") {
            let (bra, ket, _) = parse_store(line).expect("store write should parse");
            assignments.insert((bra, ket), std::mem::take(&mut pending));
        } else if line.starts_with("x_") {
            let (target, rest) = line.split_once(' ').expect("assignment should have a target");
            let (bra, ket) = parse_field(target).expect("field should parse");
            let expr = rest
                .trim_start_matches("+= ")
                .trim_start_matches("= ")
                .trim_end_matches(';');
            assignments.entry((bra, ket)).or_default().push(normalize(expr));
        }
    }
    assignments
}

fn parse_field(field: &str) -> Option<(usize, usize)> {
    let rest = field.strip_prefix("x_")?;
    let (bra, ket) = rest.split_once('_')?;
    Some((bra.parse().ok()?, ket.parse().ok()?))
}

fn parse_store(text: &str) -> Option<(usize, usize, u32)> {
    let inner = text.strip_prefix("LOCSTOREFULL(")?;
    let inner = &inner[..inner.find(')')?];
    let parts: Vec<&str> = inner.split(", ").collect();
    if parts.len() != 6 {
        return None;
    }
    Some((parts[1].parse().ok()?, parts[2].parse().ok()?, parts[5].parse().ok()?))
}

fn normalize(expr: &str) -> String {
    let mut text = expr.to_string();
    while let Some(start) = text.find("LOCSTOREFULL(") {
        let Some(len) = text[start..].find(')') else {
            break;
        };
        let Some((bra, ket, m)) = parse_store(&text[start..start + len + 1]) else {
            break;
        };
        text.replace_range(start..start + len + 1, &format!("R({},{},{})", bra, ket, m));
    }

    text.split(' ')
        .map(|token| {
            let core = token.trim_start_matches('(').trim_end_matches(')');
            let Some((object, field)) = core.split_once('.') else {
                return token.to_string();
            };
            let (Some(m), Some((bra, ket))) = (
                object.rsplit('_').next().and_then(|m| m.parse::<u32>().ok()),
                parse_field(field),
            ) else {
                return token.to_string();
            };
            token.replace(core, &format!("R({},{},{})", bra, ket, m))
        })
        .collect::<Vec<_>>()
        .join(" ")
}
