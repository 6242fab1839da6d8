//! OpenAPI 3 description of the public routes, served at `/openapi.json`.

use serde_json::{json, Value};

use crate::server::api::{HEALTH_MESSAGE, MODEL_LOADED_MESSAGE};

fn error_response(description: &str, example: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Error" },
                "example": { "detail": example }
            }
        }
    })
}

fn health_path() -> Value {
    json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "The API is up.",
                    "content": { "application/json": { "example": { "status": HEALTH_MESSAGE } } }
                }
            }
        }
    })
}

fn load_path() -> Value {
    json!({
        "post": {
            "summary": "Load model",
            "description": "Replaces the active model with the uploaded artifact.",
            "requestBody": {
                "required": true,
                "content": {
                    "multipart/form-data": {
                        "schema": {
                            "type": "object",
                            "required": ["file"],
                            "properties": { "file": { "type": "string", "format": "binary" } }
                        }
                    }
                }
            },
            "responses": {
                "200": {
                    "description": "Model loaded.",
                    "content": { "application/json": { "example": { "status": MODEL_LOADED_MESSAGE } } }
                },
                "400": error_response("The artifact could not be decoded.", "Artifact is empty"),
                "413": error_response("The artifact exceeds the upload limit.", "length limit exceeded"),
                "422": error_response("No `file` field in the upload.", "malformed request: multipart field `file` is required")
            }
        }
    })
}

fn predict_path() -> Value {
    json!({
        "post": {
            "summary": "Predict arrival delay",
            "requestBody": {
                "required": true,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/FlightFeatures" }
                    }
                }
            },
            "responses": {
                "200": {
                    "description": "Predicted arrival delay in minutes.",
                    "content": {
                        "application/json": {
                            "schema": {
                                "type": "object",
                                "properties": { "prediction": { "type": "number" } }
                            }
                        }
                    }
                },
                "400": error_response("No model has been loaded.", "Model not loaded"),
                "422": error_response("The flight record is invalid.", "field `month` must be between 1 and 12, got 13"),
                "500": error_response("The model failed to evaluate.", "Inference failed: model produced a non-finite prediction (inf)")
            }
        }
    })
}

fn history_path() -> Value {
    json!({
        "get": {
            "summary": "Prediction history",
            "responses": {
                "200": {
                    "description": "Every prediction served by this instance, oldest first.",
                    "content": {
                        "application/json": {
                            "schema": {
                                "type": "object",
                                "properties": {
                                    "history": {
                                        "type": "array",
                                        "items": {
                                            "type": "object",
                                            "properties": {
                                                "input": { "$ref": "#/components/schemas/FlightFeatures" },
                                                "prediction": { "type": "number" }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}

fn error_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "detail": { "type": "string" } }
    })
}

fn flight_features_schema() -> Value {
    json!({
        "type": "object",
        "required": [
            "month", "day", "hour", "sched_dep_time", "sched_arr_time",
            "origin", "dest", "carrier", "distance", "dep_delay"
        ],
        "properties": {
            "month": { "type": "integer", "minimum": 1, "maximum": 12 },
            "day": { "type": "integer", "minimum": 1, "maximum": 31 },
            "hour": { "type": "integer", "minimum": 0, "maximum": 23 },
            "sched_dep_time": { "type": "integer", "minimum": 0, "maximum": 2359 },
            "sched_arr_time": { "type": "integer", "minimum": 0, "maximum": 2359 },
            "origin": { "type": "string", "minLength": 3, "maxLength": 3 },
            "dest": { "type": "string", "minLength": 3, "maxLength": 3 },
            "carrier": { "type": "string", "minLength": 1, "maxLength": 3 },
            "distance": { "type": "number", "minimum": 0 },
            "dep_delay": { "type": "number" }
        },
        "example": {
            "month": 7, "day": 23, "hour": 16,
            "sched_dep_time": 1630, "sched_arr_time": 1930,
            "origin": "JFK", "dest": "LAX", "carrier": "DL",
            "distance": 3983.0, "dep_delay": 10.0
        }
    })
}

pub fn document() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Flight Delay Prediction API",
            "description": "Predicts flight arrival delay from scheduling and route attributes.",
            "version": env!("CARGO_PKG_VERSION")
        },
        "paths": {
            "/health/": health_path(),
            "/model/load/": load_path(),
            "/model/predict/": predict_path(),
            "/model/history/": history_path()
        },
        "components": {
            "schemas": {
                "Error": error_schema(),
                "FlightFeatures": flight_features_schema()
            }
        }
    })
}
