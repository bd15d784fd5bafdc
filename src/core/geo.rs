//! Flat-Earth hypocentral distance between two lat/long/depth points.
//!
//! Converts both points into a local x/y/z frame and takes the Euclidean
//! norm. Only valid for short baselines (tens of kilometres) — there is no
//! great-circle correction.

/// WGS84 semi-major axis in km.
const SEMI_MAJOR_KM: f64 = 6378.137;
/// WGS84 semi-minor axis in km.
const SEMI_MINOR_KM: f64 = 6356.7523142;
/// Length of one degree of latitude in km, treated as constant.
const KM_PER_DEG_LAT: f64 = 111.132;

/// Distance in km between (lat1, lng1, depth1) and (lat2, lng2, depth2).
///
/// Latitudes/longitudes in degrees, depths in km (a station elevation in km
/// works as well — only the absolute difference enters). The longitude
/// degree length is evaluated at `lat1` on the WGS84 ellipsoid.
pub fn flat_earth_distance_km(
    lat1: f64,
    lng1: f64,
    depth1_km: f64,
    lat2: f64,
    lng2: f64,
    depth2_km: f64,
) -> f64 {
    // First eccentricity squared of the ellipsoid.
    let e2 = (SEMI_MAJOR_KM.powi(2) - SEMI_MINOR_KM.powi(2)) / SEMI_MAJOR_KM.powi(2);

    let mut dlat = (lat2 - lat1).abs();
    let mut dlng = (lng2 - lng1).abs();
    // Degree differences wrap at 180.
    if dlat > 180.0 {
        dlat = 360.0 - dlat;
    }
    if dlng > 180.0 {
        dlng = 360.0 - dlng;
    }
    let ddepth = (depth2_km - depth1_km).abs();

    let lat1_rad = lat1.to_radians();
    let km_per_deg_lng = (std::f64::consts::PI * SEMI_MAJOR_KM * lat1_rad.cos())
        / (180.0 * (1.0 - e2 * lat1_rad.sin().powi(2)).sqrt());

    let x = KM_PER_DEG_LAT * dlat;
    let y = km_per_deg_lng * dlng;
    (x * x + y * y + ddepth * ddepth).sqrt()
}

/// Same as [`flat_earth_distance_km`] but in meters, which is what the
/// source-parameter formulas consume.
pub fn flat_earth_distance_m(
    lat1: f64,
    lng1: f64,
    depth1_km: f64,
    lat2: f64,
    lng2: f64,
    depth2_km: f64,
) -> f64 {
    flat_earth_distance_km(lat1, lng1, depth1_km, lat2, lng2, depth2_km) * 1000.0
}
