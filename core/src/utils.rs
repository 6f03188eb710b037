use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

pub fn b64_encode(b: &[u8]) -> String {
    STANDARD.encode(b)
}

pub fn b64_decode(s: &str) -> Result<Vec<u8>, String> {
    STANDARD.decode(s).map_err(|e| e.to_string())
}

/// `scheme:rest` with an RFC 3986 scheme and a non-empty remainder.
pub fn is_absolute_uri(s: &str) -> bool {
    match s.split_once(':') {
        Some((scheme, rest)) => {
            !rest.is_empty()
                && scheme.chars().next().map_or(false, |c| c.is_ascii_alphabetic())
                && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Encode a dotted-decimal OID ("2.16.840.1") into BER content octets.
///
/// The first two arcs share one sub-identifier (`40 * a0 + a1`); every
/// sub-identifier is base-128 with the continuation bit on all but the last
/// octet.
pub fn oid_to_ber(dotted: &str) -> Result<Vec<u8>, String> {
    let arcs = dotted
        .split('.')
        .map(|a| a.parse::<u64>().map_err(|_| format!("bad OID arc {:?}", a)))
        .collect::<Result<Vec<_>, _>>()?;

    if arcs.len() < 2 {
        return Err(format!("OID {:?} needs at least two arcs", dotted));
    }
    if arcs[0] > 2 || (arcs[0] < 2 && arcs[1] >= 40) {
        return Err(format!("OID {:?} has an invalid root", dotted));
    }

    let first = arcs[0]
        .checked_mul(40)
        .and_then(|v| v.checked_add(arcs[1]))
        .ok_or_else(|| format!("OID {:?} root arc overflows", dotted))?;

    let mut out = Vec::new();
    for sub in std::iter::once(first).chain(arcs[2..].iter().copied()) {
        let mut groups = vec![(sub & 0x7f) as u8];
        let mut rest = sub >> 7;
        while rest > 0 {
            groups.push(((rest & 0x7f) as u8) | 0x80);
            rest >>= 7;
        }
        out.extend(groups.iter().rev());
    }
    Ok(out)
}

/// Decode BER content octets back into dotted-decimal form.
pub fn oid_from_ber(ber: &[u8]) -> Result<String, String> {
    if ber.is_empty() {
        return Err("empty OID".into());
    }
    if ber.last().map_or(false, |b| b & 0x80 != 0) {
        return Err("truncated OID sub-identifier".into());
    }

    let mut subs = Vec::new();
    let mut acc: u64 = 0;
    let mut starting = true;
    for &b in ber {
        if starting && b == 0x80 {
            return Err("non-minimal OID sub-identifier".into());
        }
        starting = b & 0x80 == 0;
        if acc > (u64::MAX >> 7) {
            return Err("OID sub-identifier overflows".into());
        }
        acc = (acc << 7) | u64::from(b & 0x7f);
        if b & 0x80 == 0 {
            subs.push(acc);
            acc = 0;
        }
    }

    let (a0, a1) = match subs[0] {
        v if v < 40 => (0, v),
        v if v < 80 => (1, v - 40),
        v => (2, v - 80),
    };

    let mut arcs = vec![a0, a1];
    arcs.extend_from_slice(&subs[1..]);
    Ok(arcs.iter().map(u64::to_string).collect::<Vec<_>>().join("."))
}

/// Canonical dotted form of `dotted`: leading zeros and signs are dropped.
pub fn oid_canonical(dotted: &str) -> Result<String, String> {
    oid_from_ber(&oid_to_ber(dotted)?)
}
