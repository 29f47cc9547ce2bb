use crate::domain::model::ServiceListing;
use crate::domain::ports::ListingSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

struct Seed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    category: &'static str,
    location: &'static str,
    city: &'static str,
    price: (u64, u64),
    rating: f64,
    rating_count: u32,
    provider: (&'static str, &'static str),
    distance_km: f64,
    created_on: (i32, u32, u32),
}

const SEEDS: [Seed; 8] = [
    Seed {
        id: "1",
        title: "Reparación de Plomería Profesional",
        description: "Servicio completo de plomería: reparación de fugas, instalación de tuberías, mantenimiento de baños y cocinas.",
        category: "reparaciones",
        location: "Poblado, Medellín",
        city: "Medellín",
        price: (50_000, 150_000),
        rating: 4.8,
        rating_count: 127,
        provider: ("p1", "Carlos Ramírez"),
        distance_km: 2.3,
        created_on: (2025, 12, 1),
    },
    Seed {
        id: "2",
        title: "Limpieza Profunda del Hogar",
        description: "Servicio de limpieza completa: pisos, baños, cocina, ventanas y organización general.",
        category: "hogar",
        location: "Laureles, Medellín",
        city: "Medellín",
        price: (80_000, 200_000),
        rating: 5.0,
        rating_count: 89,
        provider: ("p2", "María González"),
        distance_km: 3.5,
        created_on: (2025, 12, 2),
    },
    Seed {
        id: "3",
        title: "Acompañamiento a Citas Médicas",
        description: "Servicio de acompañamiento personalizado para citas médicas, trámites de salud y soporte durante procedimientos.",
        category: "tramites",
        location: "Centro, Medellín",
        city: "Medellín",
        price: (35_000, 80_000),
        rating: 4.9,
        rating_count: 156,
        provider: ("p3", "Ana López"),
        distance_km: 1.8,
        created_on: (2025, 11, 28),
    },
    Seed {
        id: "4",
        title: "Compra de Mercado y Mandados",
        description: "Realizo tus compras de mercado, medicamentos y cualquier diligencia que necesites.",
        category: "compras",
        location: "Envigado, Antioquia",
        city: "Envigado",
        price: (25_000, 60_000),
        rating: 4.7,
        rating_count: 234,
        provider: ("p4", "Pedro Martínez"),
        distance_km: 4.2,
        created_on: (2025, 11, 30),
    },
    Seed {
        id: "5",
        title: "Reparación de Electrodomésticos",
        description: "Especialista en reparación de lavadoras, neveras, estufas y otros electrodomésticos.",
        category: "reparaciones",
        location: "Bello, Antioquia",
        city: "Bello",
        price: (60_000, 180_000),
        rating: 4.6,
        rating_count: 98,
        provider: ("p5", "Jorge Silva"),
        distance_km: 5.7,
        created_on: (2025, 11, 25),
    },
    Seed {
        id: "6",
        title: "Apoyo Administrativo y Digital",
        description: "Ayuda con trámites digitales, organización de documentos, gestión de correos y tareas administrativas.",
        category: "administrativo",
        location: "Sabaneta, Antioquia",
        city: "Sabaneta",
        price: (40_000, 100_000),
        rating: 4.8,
        rating_count: 67,
        provider: ("p6", "Laura Hernández"),
        distance_km: 6.1,
        created_on: (2025, 11, 29),
    },
    Seed {
        id: "7",
        title: "Instalación Eléctrica y Mantenimiento",
        description: "Servicios eléctricos certificados: instalaciones, reparaciones, mantenimiento preventivo.",
        category: "reparaciones",
        location: "Itagüí, Antioquia",
        city: "Itagüí",
        price: (70_000, 200_000),
        rating: 4.9,
        rating_count: 143,
        provider: ("p7", "Roberto Díaz"),
        distance_km: 7.3,
        created_on: (2025, 11, 27),
    },
    Seed {
        id: "8",
        title: "Cuidado de Mascotas",
        description: "Paseos, alimentación, cuidado general y compañía para tus mascotas.",
        category: "hogar",
        location: "Poblado, Medellín",
        city: "Medellín",
        price: (30_000, 70_000),
        rating: 5.0,
        rating_count: 201,
        provider: ("p8", "Sandra Ruiz"),
        distance_km: 2.9,
        created_on: (2025, 12, 1),
    },
];

/// The built-in listings, in catalogue order.
pub fn sample_listings() -> Vec<ServiceListing> {
    SEEDS
        .iter()
        .filter_map(|seed| {
            let (year, month, day) = seed.created_on;
            let created_on = NaiveDate::from_ymd_opt(year, month, day)?;
            Some(ServiceListing {
                id: seed.id.to_string(),
                title: seed.title.to_string(),
                description: seed.description.to_string(),
                category: seed.category.to_string(),
                image_url: None,
                location: seed.location.to_string(),
                city: seed.city.to_string(),
                department: "Antioquia".to_string(),
                price_min: seed.price.0,
                price_max: seed.price.1,
                rating: Some(seed.rating),
                rating_count: seed.rating_count,
                provider_id: seed.provider.0.to_string(),
                provider_name: seed.provider.1.to_string(),
                distance_km: Some(seed.distance_km),
                created_on,
            })
        })
        .collect()
}

/// In-memory listing source used until the listing search endpoint is live,
/// and for offline runs of the CLI.
#[derive(Debug, Clone)]
pub struct SampleCatalog {
    listings: Vec<ServiceListing>,
}

impl Default for SampleCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleCatalog {
    pub fn new() -> Self {
        Self {
            listings: sample_listings(),
        }
    }

    pub fn with_listings(listings: Vec<ServiceListing>) -> Self {
        Self { listings }
    }
}

#[async_trait]
impl ListingSource for SampleCatalog {
    async fn fetch_listings(&self) -> Result<Vec<ServiceListing>> {
        Ok(self.listings.clone())
    }
}
