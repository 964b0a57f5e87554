//! Static Niza classification tables.
//!
//! Canonical short names for the 45 classes plus the deterministic
//! keyword rules used when the generative backend is unavailable or its
//! reply cannot be parsed. All lookups here are pure.

use crate::category::{BusinessType, CategorySource, NizaCategory};

/// Lowest valid Niza class.
pub const NIZA_MIN: u8 = 1;
/// Highest valid Niza class.
pub const NIZA_MAX: u8 = 45;

/// Whether `code` is a valid Niza class number.
pub fn in_range(code: u8) -> bool {
    (NIZA_MIN..=NIZA_MAX).contains(&code)
}

/// Canonical short name for a Niza class.
pub fn class_name(code: u8) -> Option<&'static str> {
    let name = match code {
        1 => "Productos químicos",
        2 => "Pinturas y barnices",
        3 => "Cosméticos y productos de limpieza",
        4 => "Aceites y combustibles industriales",
        5 => "Productos farmacéuticos",
        6 => "Metales comunes y sus aleaciones",
        7 => "Máquinas y máquinas herramientas",
        8 => "Herramientas e instrumentos de mano",
        9 => "Aparatos científicos y tecnológicos",
        10 => "Aparatos e instrumentos médicos",
        11 => "Aparatos de alumbrado y calefacción",
        12 => "Vehículos",
        13 => "Armas de fuego y pirotecnia",
        14 => "Joyería y relojería",
        15 => "Instrumentos musicales",
        16 => "Papel y artículos de papelería",
        17 => "Caucho y materias plásticas",
        18 => "Cuero y artículos de viaje",
        19 => "Materiales de construcción no metálicos",
        20 => "Muebles",
        21 => "Utensilios de cocina y hogar",
        22 => "Cuerdas, lonas y materiales de relleno",
        23 => "Hilos para uso textil",
        24 => "Tejidos y ropa de cama",
        25 => "Prendas de vestir y calzado",
        26 => "Encajes, bordados y mercería",
        27 => "Alfombras y revestimientos de suelos",
        28 => "Juegos y juguetes",
        29 => "Carnes, lácteos y conservas",
        30 => "Café, té, pan y repostería",
        31 => "Productos agrícolas y animales vivos",
        32 => "Cervezas y bebidas sin alcohol",
        33 => "Bebidas alcohólicas",
        34 => "Tabaco y artículos para fumadores",
        35 => "Servicios comerciales y publicidad",
        36 => "Servicios financieros e inmobiliarios",
        37 => "Servicios de construcción y reparación",
        38 => "Servicios de telecomunicaciones",
        39 => "Transporte y almacenamiento",
        40 => "Tratamiento de materiales",
        41 => "Educación y entretenimiento",
        42 => "Servicios científicos y tecnológicos",
        43 => "Servicios de restauración y hospedaje",
        44 => "Servicios médicos y de belleza",
        45 => "Servicios jurídicos y de seguridad",
        _ => return None,
    };
    Some(name)
}

/// Ordered keyword rules for goods. First matching keyword wins.
const PRODUCT_RULES: &[(u8, &[&str])] = &[
    (32, &["cerveza", "refresco", "jugo", "bebida", "agua embotellada"]),
    (33, &["vino", "licor", "tequila", "mezcal", "whisky"]),
    (25, &["ropa", "calzado", "zapato", "vestido", "playera", "camisa", "pantalón"]),
    (30, &["café", "té", "pan", "repostería", "chocolate", "galleta", "dulce"]),
    (29, &["carne", "queso", "lácteo", "leche", "embutido", "conserva"]),
    (3, &["cosmético", "jabón", "perfume", "maquillaje", "crema"]),
    (5, &["medicamento", "farmacéutico", "suplemento", "vitamina"]),
    (20, &["mueble", "silla", "mesa", "colchón"]),
    (28, &["juguete", "juego de mesa", "videojuego"]),
    (9, &["software", "aplicación", "electrónico", "computadora", "tecnología"]),
];

/// Ordered keyword rules for services. First matching keyword wins.
const SERVICE_RULES: &[(u8, &[&str])] = &[
    (43, &[
        "restaurante", "café", "cafetería", "repostería", "comida", "taquería",
        "bar", "catering", "banquete", "hotel", "hospedaje",
    ]),
    (41, &["educación", "enseñanza", "curso", "capacitación", "escuela", "entretenimiento"]),
    (42, &["software", "desarrollo", "programación", "tecnología", "diseño web", "ingeniería"]),
    (44, &["médico", "salud", "clínica", "dental", "belleza", "spa", "estética"]),
    (36, &["financiero", "seguro", "banca", "crédito", "inmobiliario", "bienes raíces"]),
    (39, &["transporte", "logística", "envío", "paquetería", "mudanza"]),
    (37, &["construcción", "reparación", "mantenimiento", "plomería", "instalación"]),
    (45, &["legal", "jurídico", "abogado", "notaría", "seguridad privada"]),
    (38, &["telecomunicación", "internet", "telefonía"]),
    (35, &["publicidad", "marketing", "venta", "comercio", "tienda", "consultoría"]),
];

/// Default classification when no keyword rule matches.
pub fn default_category(business_type: BusinessType) -> NizaCategory {
    match business_type {
        BusinessType::Product => NizaCategory {
            code: 9,
            name: "Productos tecnológicos y científicos".to_string(),
            additional_codes: vec![35],
            note: "Clasificación por defecto para productos".to_string(),
            source: CategorySource::Fallback,
        },
        BusinessType::Service => NizaCategory {
            code: 35,
            name: "Servicios comerciales y publicidad".to_string(),
            additional_codes: vec![42],
            note: "Clasificación por defecto para servicios".to_string(),
            source: CategorySource::Fallback,
        },
    }
}

/// Deterministic keyword classification scoped by business type.
///
/// Used when the model call fails or its reply yields no class number.
pub fn fallback_category(description: &str, business_type: BusinessType) -> NizaCategory {
    let text = description.to_lowercase();
    let rules = match business_type {
        BusinessType::Product => PRODUCT_RULES,
        BusinessType::Service => SERVICE_RULES,
    };

    for (code, keywords) in rules {
        if let Some(hit) = keywords.iter().find(|kw| text.contains(*kw)) {
            return NizaCategory {
                code: *code,
                // Rules only reference valid classes, so the name is always present.
                name: class_name(*code).unwrap_or_default().to_string(),
                additional_codes: vec![],
                note: format!("Clasificación por palabra clave: '{}'", hit),
                source: CategorySource::Fallback,
            };
        }
    }

    default_category(business_type)
}
